use serde::{Deserialize, Serialize};

/// An update-site row linked to an extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSite {
    pub update_site_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub enabled: bool,
}

impl UpdateSite {
    /// Whether this site points at `url`, ignoring surrounding whitespace
    pub fn points_at(&self, url: &str) -> bool {
        self.location.trim() == url.trim()
    }
}
