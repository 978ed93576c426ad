pub mod catalog;
pub mod compositing;
pub mod matching;
pub mod pipeline;
pub mod scheduling;
pub mod shared;
pub mod video;
