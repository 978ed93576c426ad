use std::collections::HashMap;

use thiserror::Error;

use super::clip_asset::ClipAsset;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("duplicate clip id '{0}' in catalog")]
    DuplicateClipId(String),
}

/// Registry of the run's clips, keyed by id and kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct ClipCatalog {
    clips: Vec<ClipAsset>,
    by_id: HashMap<String, usize>,
}

impl ClipCatalog {
    pub fn from_assets(assets: Vec<ClipAsset>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(assets.len());
        for (position, asset) in assets.iter().enumerate() {
            if by_id.insert(asset.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateClipId(asset.id.clone()));
            }
        }
        Ok(Self {
            clips: assets,
            by_id,
        })
    }

    pub fn get(&self, id: &str) -> Option<&ClipAsset> {
        self.by_id.get(id).map(|&position| &self.clips[position])
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClipAsset> {
        self.clips.iter()
    }
}
