use std::path::Path;

use crate::shared::frame::{Frame, FrameSize};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Encodes `num_frames` grey frames whose brightness steps by 40 per frame.
pub(crate) fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
    create_solid_video(path, num_frames, width, height, fps, |i| {
        [((i * 40) % 256) as u8; 3]
    });
}

pub(crate) fn create_solid_video(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: f64,
    colour: impl Fn(usize) -> [u8; 3],
) {
    let meta = VideoMetadata {
        width,
        height,
        fps,
        frame_rate: None,
        total_frames: num_frames,
        duration_sec: 0.0,
        codec: String::new(),
        source_path: None,
    };
    let mut writer = FfmpegWriter::new();
    writer.open(path, &meta).unwrap();
    for i in 0..num_frames {
        writer
            .write(&Frame::solid(FrameSize::new(width, height), colour(i), i))
            .unwrap();
    }
    writer.close().unwrap();
}

/// Like [`create_test_video`], plus a mono AAC tone lasting as long as the video.
pub(crate) fn create_test_video_with_audio(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: f64,
) {
    let video_only = path.with_extension("video.mp4");
    create_test_video(&video_only, num_frames, width, height, fps);
    add_tone(&video_only, path, num_frames as f64 / fps);
    std::fs::remove_file(&video_only).unwrap();
}

fn add_tone(video_only: &Path, output: &Path, seconds: f64) {
    const SAMPLE_RATE: i32 = 44_100;

    let mut ictx = ffmpeg_next::format::input(video_only).unwrap();
    let mut octx = ffmpeg_next::format::output(output).unwrap();

    let video_stream = ictx.streams().best(ffmpeg_next::media::Type::Video).unwrap();
    let video_in_idx = video_stream.index();
    let video_in_tb = video_stream.time_base();
    let mut ost_video = octx
        .add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))
        .unwrap();
    ost_video.set_parameters(video_stream.parameters());
    unsafe {
        (*ost_video.parameters().as_mut_ptr()).codec_tag = 0;
    }
    let video_out_idx = ost_video.index();

    let aac = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).unwrap();
    let mut ost_audio = octx.add_stream(Some(aac)).unwrap();
    let audio_out_idx = ost_audio.index();
    let mut encoder = ffmpeg_next::codec::context::Context::new_with_codec(aac)
        .encoder()
        .audio()
        .unwrap();
    encoder.set_rate(SAMPLE_RATE);
    encoder.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
    encoder.set_format(ffmpeg_next::format::Sample::F32(
        ffmpeg_next::format::sample::Type::Planar,
    ));
    let mut encoder = encoder.open_as(aac).unwrap();
    ost_audio.set_parameters(&encoder);
    let enc_tb = encoder.time_base();
    let frame_size = match encoder.frame_size() as usize {
        0 => 1024,
        n => n,
    };

    octx.write_header().unwrap();
    let video_out_tb = octx.stream(video_out_idx).unwrap().time_base();
    let audio_out_tb = octx.stream(audio_out_idx).unwrap().time_base();

    for (stream, mut packet) in ictx.packets() {
        if stream.index() != video_in_idx {
            continue;
        }
        packet.rescale_ts(video_in_tb, video_out_tb);
        packet.set_position(-1);
        packet.set_stream(video_out_idx);
        packet.write_interleaved(&mut octx).unwrap();
    }

    let chunks = ((seconds * SAMPLE_RATE as f64) as usize).div_ceil(frame_size).max(1);
    let drain = |encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
                     octx: &mut ffmpeg_next::format::context::Output| {
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(audio_out_idx);
            encoded.rescale_ts(enc_tb, audio_out_tb);
            encoded.write_interleaved(octx).unwrap();
        }
    };
    for chunk in 0..chunks {
        let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            frame_size,
            ffmpeg_next::ChannelLayout::MONO,
        );
        frame.set_rate(SAMPLE_RATE as u32);
        frame.set_pts(Some((chunk * frame_size) as i64));
        let samples: Vec<f32> = (0..frame_size)
            .map(|i| {
                let t = (chunk * frame_size + i) as f32 / SAMPLE_RATE as f32;
                (t * 440.0 * std::f32::consts::TAU).sin() * 0.2
            })
            .collect();
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
        frame.data_mut(0)[..bytes.len()].copy_from_slice(&bytes);

        encoder.send_frame(&frame).unwrap();
        drain(&mut encoder, &mut octx);
    }
    encoder.send_eof().unwrap();
    drain(&mut encoder, &mut octx);

    octx.write_trailer().unwrap();
}
