//! Classification models
//!
//! A classification record is exchanged with the API verbatim. Only `name`
//! (required) and `id` (server assigned) carry meaning for this tool.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields stamped on exported records and stripped again on import
pub const EXPORT_METADATA_FIELDS: [&str; 3] = ["export_date", "export_org", "export_user"];

/// An opaque classification record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(pub Map<String, Value>);

impl Classification {
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.0.get("description").and_then(Value::as_str)
    }

    /// Copy without export metadata and server id, ready to send
    pub fn prepared_for_import(&self) -> Classification {
        let mut fields = self.0.clone();
        for field in EXPORT_METADATA_FIELDS.iter().chain(std::iter::once(&"id")) {
            fields.remove(*field);
        }
        Classification(fields)
    }

    /// Stamp export metadata onto the record
    pub fn stamp_export(&mut self, date: &str, org: &str, user: &str) {
        self.0.insert("export_date".to_string(), Value::from(date));
        self.0.insert("export_org".to_string(), Value::from(org));
        self.0.insert("export_user".to_string(), Value::from(user));
    }
}

impl From<Value> for Classification {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Classification(map),
            _ => Classification::default(),
        }
    }
}

/// Entry of the classification list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of the classification list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationPage {
    #[serde(default, alias = "content", alias = "data")]
    pub classifications: Vec<ClassificationSummary>,

    /// Total number of classifications, when reported
    #[serde(default, alias = "totalCount")]
    pub total: Option<usize>,
}
