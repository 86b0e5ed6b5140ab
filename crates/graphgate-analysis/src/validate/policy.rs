//! Access-policy lint for generated source text.
//!
//! Generated code must read raw audio buffers through the approved accessor
//! macros (`AUDIO_*`). Text that indexes a raw buffer directly and never
//! mentions an accessor is flagged. This is a conservative textual check: a
//! clean result does not prove the absence of direct access.

use graphgate_core::artifact::{MemoryAccessFinding, Violation};
use graphgate_core::config::PolicyConfig;
use graphgate_core::error::{GateError, Result};
use graphgate_core::model::Severity;
use regex::Regex;

pub const AUDIO_DIRECT_ACCESS: &str = "audio.directAccess";

/// Compiled disallowed patterns plus the accessor token.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    disallowed: Vec<Regex>,
    accessor: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GateError::Policy {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl AccessPolicy {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Policy`] for the first pattern that is not a
    /// valid regular expression.
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        let disallowed = config
            .disallowed_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>>>()?;
        let accessor = compile(&config.accessor_token)?;
        Ok(Self {
            disallowed,
            accessor,
        })
    }

    /// Whether the text mentions an approved accessor anywhere.
    #[must_use]
    pub fn has_accessor(&self, text: &str) -> bool {
        self.accessor.is_match(text)
    }

    /// At most one `audio.directAccess` error for the whole text.
    #[must_use]
    pub fn lint_text(&self, name: &str, text: &str) -> Vec<Violation> {
        let Some(hit) = self.disallowed.iter().find(|re| re.is_match(text)) else {
            return Vec::new();
        };
        if self.has_accessor(text) {
            return Vec::new();
        }
        vec![Violation {
            id: AUDIO_DIRECT_ACCESS.to_string(),
            node: name.to_string(),
            message: format!(
                "direct raw-buffer access matching `{}` without an approved accessor",
                hit.as_str()
            ),
            severity: Severity::Error,
        }]
    }

    /// One finding per disallowed match, with 1-based line and column.
    ///
    /// A file that mentions an accessor anywhere yields no findings.
    #[must_use]
    pub fn scan(&self, file: &str, text: &str) -> Vec<MemoryAccessFinding> {
        if self.has_accessor(text) {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            for re in &self.disallowed {
                for m in re.find_iter(line) {
                    findings.push(MemoryAccessFinding {
                        file: file.to_string(),
                        line: idx + 1,
                        column: line[..m.start()].chars().count() + 1,
                        pattern: re.as_str().to_string(),
                        snippet: line.trim().to_string(),
                    });
                }
            }
        }
        findings.sort_by_key(|f| (f.line, f.column));
        findings
    }
}
