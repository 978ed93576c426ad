pub mod crossfade;
pub mod duration_normalizer;
pub mod frame_resizer;
pub mod playable_clip;
pub mod timeline_compositor;
