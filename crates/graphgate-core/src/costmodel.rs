//! Cost model input documents.
//!
//! Two shapes are accepted:
//!
//! - a table of per-kind averages: `{"0": {"us": 1.5}, "blend": {"us": 4}}`
//! - a raw sample list: `[{"nodeKind": 0, "us": 1.4}, {"nodeKind": "blend", "us": 4.1}]`
//!
//! Kind keys are labels. Integer kinds from the CSR `nodeKind` array use
//! their decimal form as the label.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};

const ARTIFACT: &str = "cost model";

/// A node kind as written in sample lists: an integer index or a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KindKey {
    Index(u64),
    Label(String),
}

impl KindKey {
    /// The label this kind is looked up under.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Index(i) => i.to_string(),
            Self::Label(s) => s.clone(),
        }
    }
}

/// One observed execution time for a node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSample {
    pub node_kind: KindKey,
    pub us: f64,
}

/// Average cost entry of a cost table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindCost {
    pub us: f64,
}

/// A decoded cost model document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostModelDocument {
    Table(BTreeMap<String, KindCost>),
    Samples(Vec<CostSample>),
}

impl CostModelDocument {
    /// Parse and validate a cost model document.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Malformed`] if the JSON matches neither shape or
    /// any cost is negative or not finite.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text).map_err(|_| {
            GateError::malformed(
                ARTIFACT,
                "expected {\"<kind>\": {\"us\": number}} or [{\"nodeKind\", \"us\"}]",
            )
        })?;
        doc.check()?;
        Ok(doc)
    }

    fn check(&self) -> Result<()> {
        let bad = match self {
            Self::Table(table) => table
                .iter()
                .find(|(_, c)| !valid_cost(c.us))
                .map(|(k, c)| format!("kind `{k}` has invalid cost {}", c.us)),
            Self::Samples(samples) => samples
                .iter()
                .enumerate()
                .find(|(_, s)| !valid_cost(s.us))
                .map(|(i, s)| format!("sample {i} has invalid cost {}", s.us)),
        };
        bad.map_or(Ok(()), |reason| Err(GateError::malformed(ARTIFACT, reason)))
    }
}

fn valid_cost(us: f64) -> bool {
    us.is_finite() && us >= 0.0
}
