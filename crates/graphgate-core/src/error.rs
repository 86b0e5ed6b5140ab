//! Error taxonomy shared by every pipeline stage.
//!
//! [`GateError`] is the structured error returned by loaders, writers and
//! configuration resolution. Each variant maps to a stable [`ErrorCode`] and
//! to a process exit code, so the binary can report failures without
//! inspecting message text.
//!
//! Gate failures and detected cycles are *not* errors: they are data carried
//! in the artifacts and surfaced through the gate status.

use std::fmt;
use std::path::{Path, PathBuf};

/// Process exit code for a successful stage.
pub const EXIT_OK: u8 = 0;
/// Process exit code for a reported gate (soft) failure.
pub const EXIT_GATE_FAILED: u8 = 1;
/// Process exit code for usage, I/O, configuration and malformed-input errors.
pub const EXIT_USAGE_OR_IO: u8 = 2;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArguments,
    MissingThreshold,
    ConfigParseError,
    ConfigNotFound,
    ArtifactUnreadable,
    ArtifactUnwritable,
    MalformedInput,
    InvalidPolicyPattern,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidArguments => "E1001",
            Self::MissingThreshold => "E1002",
            Self::ConfigParseError => "E1101",
            Self::ConfigNotFound => "E1102",
            Self::ArtifactUnreadable => "E2001",
            Self::ArtifactUnwritable => "E2002",
            Self::MalformedInput => "E3001",
            Self::InvalidPolicyPattern => "E3002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidArguments => "Invalid command-line arguments",
            Self::MissingThreshold => "Gate threshold not supplied",
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigNotFound => "Config file not found",
            Self::ArtifactUnreadable => "Artifact could not be read",
            Self::ArtifactUnwritable => "Artifact could not be written",
            Self::MalformedInput => "Malformed input document",
            Self::InvalidPolicyPattern => "Invalid access-policy pattern",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidArguments => Some("Run `graphgate help <stage>` for the expected flags."),
            Self::MissingThreshold => Some(
                "Pass --latency-budget-ms and --cpu-budget-pct, or set them under [gate] in graphgate.toml.",
            ),
            Self::ConfigParseError => Some("Fix syntax in graphgate.toml and retry."),
            Self::ConfigNotFound => Some("Check the path given to --config."),
            Self::ArtifactUnreadable => Some("Check that the upstream stage ran and the path is readable."),
            Self::ArtifactUnwritable => Some("Check disk space and write permissions on the output directory."),
            Self::MalformedInput => Some("Regenerate the input; it does not match the documented schema."),
            Self::InvalidPolicyPattern => Some("Fix the regular expression under [policy] in graphgate.toml."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors produced while loading inputs, resolving configuration or
/// persisting artifacts.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Bad or missing arguments.
    #[error("usage: {0}")]
    Usage(String),

    /// A required gate threshold was supplied neither by flag nor by config.
    #[error("missing gate threshold: {0}")]
    MissingThreshold(&'static str),

    /// An artifact could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document was readable but does not satisfy its schema.
    #[error("malformed {artifact}: {reason}")]
    Malformed { artifact: String, reason: String },

    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {}", .0.display())]
    ConfigMissing(PathBuf),

    /// The configuration file could not be read or parsed.
    #[error("config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A configured access-policy regular expression failed to compile.
    #[error("invalid policy pattern `{pattern}`: {reason}")]
    Policy { pattern: String, reason: String },
}

impl GateError {
    /// Build a [`GateError::Malformed`] for the named artifact.
    pub fn malformed(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`GateError::Read`] for `path`.
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Build a [`GateError::Write`] for `path`.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The stable error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Usage(_) => ErrorCode::InvalidArguments,
            Self::MissingThreshold(_) => ErrorCode::MissingThreshold,
            Self::Read { .. } => ErrorCode::ArtifactUnreadable,
            Self::Write { .. } => ErrorCode::ArtifactUnwritable,
            Self::Malformed { .. } => ErrorCode::MalformedInput,
            Self::ConfigMissing(_) => ErrorCode::ConfigNotFound,
            Self::Config { .. } => ErrorCode::ConfigParseError,
            Self::Policy { .. } => ErrorCode::InvalidPolicyPattern,
        }
    }

    /// Every error in this taxonomy aborts the stage with exit code 2.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        EXIT_USAGE_OR_IO
    }

    /// Remediation text for the operator.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}

/// Result alias used throughout the core crate.
pub type Result<T, E = GateError> = std::result::Result<T, E>;
