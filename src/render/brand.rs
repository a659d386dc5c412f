use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::render::model::BrandStyle;

/// Brand settings for one workspace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandProfile {
    /// Colors and fonts for every creative of the workspace.
    pub style: BrandStyle,
    /// Preferred segmentation model identifier, if the workspace picked one.
    #[serde(default)]
    pub segmentation_model: Option<String>,
}

/// Read-only lookup of brand profiles by workspace id.
pub trait BrandStore: Send + Sync {
    /// Profile for `workspace_id`, or `None` if the workspace is unknown.
    fn brand_profile(&self, workspace_id: &str) -> Option<BrandProfile>;
}

/// Map-backed [`BrandStore`].
#[derive(Debug, Default)]
pub struct InMemoryBrandStore {
    profiles: RwLock<HashMap<String, BrandProfile>>,
}

impl InMemoryBrandStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the profile for `workspace_id`.
    pub fn insert(&self, workspace_id: impl Into<String>, profile: BrandProfile) {
        self.profiles.write().insert(workspace_id.into(), profile);
    }
}

impl BrandStore for InMemoryBrandStore {
    fn brand_profile(&self, workspace_id: &str) -> Option<BrandProfile> {
        self.profiles.read().get(workspace_id).cloned()
    }
}
