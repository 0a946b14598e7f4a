//! Resource roles and address construction.
//!
//! Layout: `{base_url}/{key}/{file_name}`, one address per role, always in
//! `ResourceName::ALL` order so responses pair back with their role by index.

use super::key_index::KeyIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four files that make up one day's bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceName {
    TickData,
    TickStructure,
    Summary,
    SummaryStructure,
}

impl ResourceName {
    pub const ALL: [ResourceName; 4] = [
        ResourceName::TickData,
        ResourceName::TickStructure,
        ResourceName::Summary,
        ResourceName::SummaryStructure,
    ];

    /// File name as published by the provider.
    pub fn file_name(self) -> &'static str {
        match self {
            ResourceName::TickData => "WEBPXTICK_DT.zip",
            ResourceName::TickStructure => "TickData_structure.dat",
            ResourceName::Summary => "TC.txt",
            ResourceName::SummaryStructure => "TC_structure.dat",
        }
    }

    /// Structure files describe column layouts and carry no publication date.
    pub fn is_structure(self) -> bool {
        matches!(
            self,
            ResourceName::TickStructure | ResourceName::SummaryStructure
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceName::TickData => "tick_data",
            ResourceName::TickStructure => "tick_structure",
            ResourceName::Summary => "summary",
            ResourceName::SummaryStructure => "summary_structure",
        }
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully-qualified address for one role under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAddress {
    pub resource: ResourceName,
    pub key: KeyIndex,
    pub url: String,
}

/// Builds resource addresses from a fixed base path.
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    base_url: String,
}

impl ResourceLocator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn address(&self, key: KeyIndex, resource: ResourceName) -> ResourceAddress {
        ResourceAddress {
            resource,
            key,
            url: format!("{}/{key}/{}", self.base_url, resource.file_name()),
        }
    }

    /// All four addresses for a key, in `ResourceName::ALL` order.
    pub fn build_addresses(&self, key: KeyIndex) -> [ResourceAddress; 4] {
        ResourceName::ALL.map(|resource| self.address(key, resource))
    }
}
