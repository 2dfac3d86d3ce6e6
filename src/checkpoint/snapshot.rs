//! On-disk progress snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::crawl_engine::crawl_types::{DiscoverySource, FailedUrl, Section};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub tested: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedEntry {
    pub url: String,
    pub title: String,
    pub content_length: usize,
    pub section: String,
    pub page_number: u32,
    pub source: DiscoverySource,
    #[serde(default)]
    pub local_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_base: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    pub url: String,
    pub reason: String,
}

/// Everything needed to resume a run without refetching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub summary: SnapshotSummary,
    #[serde(default)]
    pub accepted: Vec<AcceptedEntry>,
    #[serde(default)]
    pub rejected: Vec<RejectedEntry>,
    #[serde(default)]
    pub failed: Vec<FailedUrl>,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Link-discovered URLs still queued when the snapshot was taken
    #[serde(default)]
    pub pending: Vec<String>,
    /// Image source as written in markup to its mirror-relative path
    #[serde(default)]
    pub asset_map: BTreeMap<String, String>,
}
