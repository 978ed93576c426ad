pub mod reader_clip_analyzer;
