//! Common CLI types shared across commands

use clap::Args;

use crate::client::models::Capability;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - human-readable rows (global default)
    #[default]
    Table,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Catalog source capabilities to run; at least one is required.
#[derive(Args, Debug, Clone, Default)]
#[group(required = true, multiple = true)]
pub struct CapabilityArgs {
    /// Run metadata extraction
    #[arg(long)]
    pub metadata_extraction: bool,

    /// Run data profiling
    #[arg(long)]
    pub data_profiling: bool,

    /// Run data classification
    #[arg(long)]
    pub data_classification: bool,

    /// Run data quality
    #[arg(long)]
    pub data_quality: bool,

    /// Run relationship discovery
    #[arg(long)]
    pub relationship_discovery: bool,

    /// Run glossary association
    #[arg(long)]
    pub glossary_association: bool,

    /// Run lineage discovery
    #[arg(long)]
    pub lineage_discovery: bool,
}

impl CapabilityArgs {
    /// Selected capabilities, in a fixed order.
    pub fn selected(&self) -> Vec<Capability> {
        [
            (self.metadata_extraction, Capability::MetadataExtraction),
            (self.data_profiling, Capability::DataProfiling),
            (self.data_classification, Capability::DataClassification),
            (self.data_quality, Capability::DataQuality),
            (self.relationship_discovery, Capability::RelationshipDiscovery),
            (self.glossary_association, Capability::GlossaryAssociation),
            (self.lineage_discovery, Capability::LineageDiscovery),
        ]
        .into_iter()
        .filter_map(|(on, capability)| on.then_some(capability))
        .collect()
    }
}
