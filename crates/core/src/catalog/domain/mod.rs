pub mod clip_analyzer;
pub mod clip_asset;
pub mod clip_catalog;
