use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use studio_runtime::TaskError;

/// Version selector that matches any published version.
pub const ANY_VERSION: &str = "ANY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub package_id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dependencies: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
}

impl PackageDescriptor {
    pub fn new(package_id: &str, name: &str, version: &str) -> Self {
        Self {
            package_id: package_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
            dependencies: None,
            license: None,
        }
    }

    pub fn matches_version(&self, selector: &str) -> bool {
        selector == ANY_VERSION || self.version == selector
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.version, self.package_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageTab {
    Updates,
    TopDownloads,
    TopRated,
    Purchased,
    Bookmarks,
}

impl PackageTab {
    pub const ALL: [PackageTab; 5] = [
        PackageTab::Updates,
        PackageTab::TopDownloads,
        PackageTab::TopRated,
        PackageTab::Purchased,
        PackageTab::Bookmarks,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PackageTab::Updates => "updates",
            PackageTab::TopDownloads => "top_downloads",
            PackageTab::TopRated => "top_rated",
            PackageTab::Purchased => "purchased",
            PackageTab::Bookmarks => "bookmarks",
        }
    }

    /// Tabs whose content depends on the logged in account.
    pub fn is_account_dependent(self) -> bool {
        matches!(self, PackageTab::Purchased | PackageTab::Bookmarks)
    }
}

impl fmt::Display for PackageTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PackageTab {
    type Err = PackageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PackageTab::ALL
            .into_iter()
            .find(|tab| tab.key() == value)
            .ok_or_else(|| PackageError::UnknownTab(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PackageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("update server error: {0}")]
    Server(String),
    #[error("unknown package tab '{0}'")]
    UnknownTab(String),
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Remote source of package names and descriptors.
pub trait UpdateServer: Send + Sync {
    fn package_names(&self, tab: PackageTab) -> Result<Vec<String>, PackageError>;

    /// `Ok(None)` when the server knows no matching package.
    fn package_info(
        &self,
        package_id: &str,
        version_selector: &str,
    ) -> Result<Option<PackageDescriptor>, PackageError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageIndex {
    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
    #[serde(default)]
    pub tabs: BTreeMap<PackageTab, Vec<String>>,
}

/// Update server answering from a JSON package index.
#[derive(Debug, Clone, Default)]
pub struct JsonUpdateServer {
    index: PackageIndex,
}

impl JsonUpdateServer {
    pub fn new(index: PackageIndex) -> Self {
        Self { index }
    }

    pub fn from_json(data: &str) -> Result<Self, PackageError> {
        Ok(Self::new(serde_json::from_str(data)?))
    }

    pub fn load(path: &Path) -> Result<Self, PackageError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn index(&self) -> &PackageIndex {
        &self.index
    }
}

impl UpdateServer for JsonUpdateServer {
    fn package_names(&self, tab: PackageTab) -> Result<Vec<String>, PackageError> {
        Ok(self.index.tabs.get(&tab).cloned().unwrap_or_default())
    }

    fn package_info(
        &self,
        package_id: &str,
        version_selector: &str,
    ) -> Result<Option<PackageDescriptor>, PackageError> {
        // Later entries win, so an index can list versions oldest first.
        Ok(self
            .index
            .packages
            .iter()
            .rev()
            .find(|p| p.package_id == package_id && p.matches_version(version_selector))
            .cloned())
    }
}
