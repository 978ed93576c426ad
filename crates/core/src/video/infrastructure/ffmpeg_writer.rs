use std::path::{Path, PathBuf};

use crate::shared::constants::FALLBACK_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes composite frames via ffmpeg-next and carries the base track's
/// audio into the result.
///
/// Audio is stream-copied from `metadata.source_path` after the video
/// trailer is written, so no separate ffmpeg binary is needed.
pub struct FfmpegWriter {
    output_path: Option<PathBuf>,
    audio_source: Option<PathBuf>,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    /// Encoder time base, one tick per frame: the inverse of the frame rate.
    time_base: ffmpeg_next::Rational,
    bit_rate: Option<usize>,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            output_path: None,
            audio_source: None,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: ffmpeg_next::Rational(1, FALLBACK_FPS as i32),
            bit_rate: None,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Target video bit rate in bits per second. Defaults to the codec's own.
    pub fn with_bit_rate(mut self, bit_rate: usize) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };
        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        self.width = metadata.width;
        self.height = metadata.height;
        let (rate_num, rate_den) = metadata.rational_fps();
        self.time_base = ffmpeg_next::Rational(rate_den, rate_num);
        self.output_path = Some(path.to_path_buf());
        self.audio_source = metadata.source_path.clone();

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        // MPEG4 ships with every ffmpeg build, unlike libx264
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(self.time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(rate_num, rate_den)));
        if let Some(bit_rate) = self.bit_rate {
            encoder_ctx.set_bit_rate(bit_rate);
        }

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        self.video_stream_index = ost.index();

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler)) = (self.encoder.as_mut(), self.scaler.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "FfmpegWriter: frame is {}x{}, stream is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let dst = rgb_frame.data_mut(0);
        for (row, src_row) in frame.data().chunks_exact(row_bytes).enumerate() {
            let dst_start = row * stride;
            dst[dst_start..dst_start + row_bytes].copy_from_slice(src_row);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        if let (Some(source), Some(output)) = (self.audio_source.take(), self.output_path.take()) {
            if let Err(e) = mux_audio(&source, &output) {
                log::warn!("Audio passthrough from {} failed: {e}", source.display());
            }
        }

        Ok(())
    }
}

/// Copies the audio streams of `source` into `video_output` by remuxing
/// through a sibling temp file. A source without audio is left alone.
fn mux_audio(source: &Path, video_output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut ictx_source = ffmpeg_next::format::input(source)?;

    let has_audio = ictx_source
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .is_some();
    if !has_audio {
        return Ok(());
    }

    let mut ictx_video = ffmpeg_next::format::input(video_output)?;

    let ext = video_output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp4");
    let temp_path = video_output.with_extension(format!("mux.{ext}"));

    let result = remux(&mut ictx_video, &mut ictx_source, &temp_path)
        .and_then(|()| std::fs::rename(&temp_path, video_output).map_err(Into::into));
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

fn remux(
    ictx_video: &mut ffmpeg_next::format::context::Input,
    ictx_source: &mut ffmpeg_next::format::context::Input,
    temp_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut octx = ffmpeg_next::format::output(temp_path)?;

    let video_map = map_streams(ictx_video, &mut octx, ffmpeg_next::media::Type::Video, 0)?;
    let next_index = video_map.iter().filter(|m| m.is_some()).count();
    let audio_map = map_streams(
        ictx_source,
        &mut octx,
        ffmpeg_next::media::Type::Audio,
        next_index,
    )?;

    octx.write_header()?;
    copy_packets(ictx_video, &mut octx, &video_map)?;
    copy_packets(ictx_source, &mut octx, &audio_map)?;
    octx.write_trailer()?;
    Ok(())
}

/// Adds a stream-copy output stream for every input stream of `medium`.
/// Returns, per input stream index, the output index it maps to.
fn map_streams(
    ictx: &ffmpeg_next::format::context::Input,
    octx: &mut ffmpeg_next::format::context::Output,
    medium: ffmpeg_next::media::Type,
    first_index: usize,
) -> Result<Vec<Option<usize>>, Box<dyn std::error::Error>> {
    let mut map = vec![None; ictx.nb_streams() as usize];
    let mut next = first_index;

    for (idx, stream) in ictx.streams().enumerate() {
        if stream.parameters().medium() != medium {
            continue;
        }
        let mut ost = octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
        ost.set_parameters(stream.parameters());
        // Let the muxer pick a tag valid for the output container.
        unsafe {
            (*ost.parameters().as_mut_ptr()).codec_tag = 0;
        }
        map[idx] = Some(next);
        next += 1;
    }

    Ok(map)
}

fn copy_packets(
    ictx: &mut ffmpeg_next::format::context::Input,
    octx: &mut ffmpeg_next::format::context::Output,
    map: &[Option<usize>],
) -> Result<(), Box<dyn std::error::Error>> {
    let time_bases: Vec<_> = ictx.streams().map(|s| s.time_base()).collect();

    for (stream, mut packet) in ictx.packets() {
        let ist_idx = stream.index();
        let Some(ost_idx) = map.get(ist_idx).copied().flatten() else {
            continue;
        };
        let ost_time_base = octx
            .stream(ost_idx)
            .ok_or("mux: output stream missing")?
            .time_base();
        packet.rescale_ts(time_bases[ist_idx], ost_time_base);
        packet.set_position(-1);
        packet.set_stream(ost_idx);
        packet.write_interleaved(octx)?;
    }

    Ok(())
}
