//! Catalog source and scan job models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of an asset search request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub from: usize,
    pub size: usize,
    pub filter_spec: Vec<SearchFilter>,
}

/// A single search filter
#[derive(Debug, Clone, Serialize)]
pub struct SearchFilter {
    #[serde(rename = "type")]
    pub kind: String,
    pub expr: String,
}

impl SearchRequest {
    /// DSL query matching non-reference catalog sources with the given name
    pub fn catalog_source(name: &str) -> Self {
        Self {
            from: 0,
            size: 100,
            filter_spec: vec![SearchFilter {
                kind: "dsl".to_string(),
                expr: format!(
                    "core.classType core.Resource and core.reference False and core.name '{}'",
                    name.replace('\'', "\\'")
                ),
            }],
        }
    }
}

/// Asset search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub summary: SearchSummary,

    #[serde(default)]
    pub hits: Vec<CatalogAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSummary {
    /// Number of matches; the API reports it as a number or a string
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_hits: u64,
}

fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CountValue {
        Integer(u64),
        String(String),
    }

    match CountValue::deserialize(deserializer)? {
        CountValue::Integer(i) => Ok(i),
        CountValue::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A search hit
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogAsset {
    #[serde(default)]
    pub summary: AssetSummary,

    #[serde(default, rename = "systemAttributes")]
    pub system_attributes: SystemAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetSummary {
    #[serde(default, rename = "core.name")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemAttributes {
    /// Catalog source id used to start jobs
    #[serde(default, rename = "core.origin")]
    pub origin: Option<String>,
}

/// A resolved catalog source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub id: String,
    pub name: String,
}

/// Scanner capabilities that can be requested for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    MetadataExtraction,
    DataProfiling,
    DataClassification,
    DataQuality,
    RelationshipDiscovery,
    GlossaryAssociation,
    LineageDiscovery,
}

impl Capability {
    /// Name the API expects
    pub fn display_name(&self) -> &'static str {
        match self {
            Capability::MetadataExtraction => "Metadata Extraction",
            Capability::DataProfiling => "Data Profiling",
            Capability::DataClassification => "Data Classification",
            Capability::DataQuality => "Data Quality",
            Capability::RelationshipDiscovery => "Relationship Discovery",
            Capability::GlossaryAssociation => "Glossary Association",
            Capability::LineageDiscovery => "Lineage Discovery",
        }
    }
}

/// Body of a run-job request
#[derive(Debug, Clone, Serialize)]
pub struct RunJobRequest {
    pub capabilities: Vec<String>,
}

/// Response to starting a catalog source job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStarted {
    #[serde(default, rename = "jobId")]
    pub job_id: Option<String>,

    #[serde(default, rename = "jobUri")]
    pub job_uri: Option<String>,

    #[serde(default, rename = "trackingURI")]
    pub tracking_uri: Option<String>,
}

/// A submitted scan job
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    pub job_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_uri: Option<String>,

    pub catalog_source_name: String,

    pub catalog_source_id: String,
}

/// Job status as reported by the API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Remaining fields, kept for JSON output
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Coarse classification of a job status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Succeeded,
    CompletedWithErrors,
    Failed,
    Running,
}

impl JobStatus {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Self::default()
        }
    }

    pub fn job_state(&self) -> JobState {
        match self.status.to_ascii_uppercase().as_str() {
            "COMPLETED" | "SUCCESS" | "SUCCESSFUL" => JobState::Succeeded,
            "PARTIAL_COMPLETED" => JobState::CompletedWithErrors,
            "FAILED" | "ERROR" | "CANCELLED" => JobState::Failed,
            _ => JobState::Running,
        }
    }
}
