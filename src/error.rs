//! Error types.
//!
//! Store mutations fail with [`StoreError`], network and asset reads with
//! [`FetchError`], and imports with [`ImportError`].

use std::path::PathBuf;
use thiserror::Error;

/// Format per-field problems as `field: message; field: message`.
fn format_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return String::from("(no details)");
    }
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by [`BuildStore`](crate::store::BuildStore) mutators.
///
/// Every mutator that addresses an agent, loadout, buff or area by id
/// reports a missing target with one of the `*NotFound` variants and
/// leaves the state untouched.
///
/// # Examples
///
/// ```rust
/// use zzplan::StoreError;
///
/// let err = StoreError::AgentNotFound("1041".to_string());
/// assert_eq!(err.to_string(), "agent not found: 1041");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("loadout {loadout_id} not found on agent {agent_id}")]
    LoadoutNotFound { agent_id: String, loadout_id: String },

    #[error("custom buff {buff_id} not found on loadout {loadout_id}")]
    BuffNotFound { loadout_id: String, buff_id: String },

    #[error("area not found: {0}")]
    AreaNotFound(String),

    /// The id has no entry in the loaded agent catalogue.
    #[error("no catalogue entry for agent id {0}")]
    UnknownCatalogueId(String),

    #[error("agent {0} is already tracked")]
    AgentExists(String),

    #[error("agent {agent_id} already has the maximum of {max} loadouts")]
    LoadoutLimit { agent_id: String, max: usize },

    #[error("disc slot {0} outside 1..=6")]
    InvalidSlot(u8),

    #[error("upgrade chance {0} outside [0, 1]")]
    InvalidUpgradeChance(f64),

    /// NaN and infinities cannot be persisted as JSON numbers.
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while fetching catalogue assets or API documents.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single field that failed import validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path to the offending field, e.g. `agents[0].loadouts`.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors raised by [`import_state`](crate::store::BuildStore::import_state).
///
/// An import is all-or-nothing: any error leaves the store unchanged.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The text is not JSON at all.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("import document must be a JSON object")]
    NotAnObject,

    /// One or more fields have the wrong shape.
    #[error("schema mismatch: {}", format_fields(.0))]
    Schema(Vec<FieldError>),

    /// The shape is right but the build tree breaks an invariant.
    #[error("invalid build data: {}", format_fields(.0))]
    Invalid(Vec<FieldError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::LoadoutNotFound {
            agent_id: "1011".to_string(),
            loadout_id: "x".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("1011"));
        assert!(display.contains("x"));
    }

    #[test]
    fn test_value_error_display() {
        let err = StoreError::NonFinite {
            field: "statWeights.ATK".to_string(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "statWeights.ATK must be a finite number, got NaN");
        assert_eq!(
            StoreError::InvalidUpgradeChance(1.5).to_string(),
            "upgrade chance 1.5 outside [0, 1]"
        );
    }

    #[test]
    fn test_schema_error_lists_fields() {
        let err = ImportError::Schema(vec![
            FieldError::new("agents", "expected a sequence"),
            FieldError::new("fontPreset", "unknown variant `comic`"),
        ]);
        let display = err.to_string();
        assert!(display.contains("agents: expected a sequence"));
        assert!(display.contains("; fontPreset: unknown variant"));
    }

    #[test]
    fn test_empty_field_list_display() {
        let err = ImportError::Invalid(vec![]);
        assert!(err.to_string().contains("(no details)"));
    }
}
