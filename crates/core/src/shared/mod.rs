pub mod constants;
pub mod frame;
pub mod policy;
pub mod video_metadata;
