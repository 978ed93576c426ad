pub mod clip_preparation;
pub mod threaded_timeline_compositor;
