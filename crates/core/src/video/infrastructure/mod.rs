pub mod ffmpeg_reader;
pub mod ffmpeg_writer;

#[cfg(test)]
pub(crate) mod test_video;
#[cfg(test)]
pub(crate) mod memory_video;
