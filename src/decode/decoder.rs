//! FFmpeg-backed video source.
//! Video decode output is RGBA8, scaled at source resolution.

use std::path::{Path, PathBuf};
use ffmpeg_next as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{Context as ScalingContext, Flags as ScalingFlags};
use ffmpeg::Rational;
use crate::core::time::{self, Time};
use crate::decode::source::{DecodeError, VideoFrame, VideoSource};
use crate::decode::stream_info::{estimate_frame_count, VideoStreamInfo};

impl From<ffmpeg::Error> for DecodeError {
    fn from(err: ffmpeg::Error) -> Self {
        DecodeError::FFmpeg(err.to_string())
    }
}

/// Video file decoded with FFmpeg
pub struct FfmpegSource {
    path: PathBuf,
    input: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ScalingContext,
    info: VideoStreamInfo,
    time_base: Rational,
    decoded: ffmpeg::frame::Video,
    scaled: ffmpeg::frame::Video,
    // Frames decoded after a keyframe seek are dropped until this one
    skip_until: Option<u64>,
    eof_sent: bool,
}

impl FfmpegSource {
    /// Open a video file and prepare its best video stream for decoding
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DecodeError::FileNotFound(path.to_path_buf()));
        }

        ffmpeg::init().map_err(|e| DecodeError::FFmpeg(format!("FFmpeg init failed: {}", e)))?;

        let input = ffmpeg::format::input(&path)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(DecodeError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let fps = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(30.0);

        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else if stream.duration() > 0 {
            let duration_secs = time::to_seconds(pts_to_nanos(stream.duration(), time_base));
            estimate_frame_count(duration_secs, fps)
        } else {
            let duration_secs = input.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
            estimate_frame_count(duration_secs, fps)
        };

        let context = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
        let codec_name = format!("{:?}", context.id()).to_lowercase();
        let decoder = context.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGBA,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let info = VideoStreamInfo {
            index: stream_index,
            codec_name,
            width,
            height,
            fps,
            frame_count,
        };

        log::info!(
            "Opened {:?}: {}x{} {} @ {:.3} fps, {} frames",
            path,
            width,
            height,
            info.codec_name,
            fps,
            frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            input,
            decoder,
            scaler,
            info,
            time_base,
            decoded: ffmpeg::frame::Video::empty(),
            scaled: ffmpeg::frame::Video::empty(),
            skip_until: None,
            eof_sent: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Feed the decoder one packet of our stream, or EOF when the demuxer
    /// is exhausted. Returns false once there is nothing left to feed.
    fn feed_decoder(&mut self) -> Result<bool, DecodeError> {
        if self.eof_sent {
            return Ok(false);
        }

        let stream_index = self.info.index;
        let mut packets = self.input.packets();
        loop {
            match packets.next() {
                Some((stream, packet)) if stream.index() == stream_index => {
                    self.decoder.send_packet(&packet)?;
                    return Ok(true);
                }
                Some(_) => continue,
                None => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                    return Ok(true);
                }
            }
        }
    }

    fn frame_index_of(&self, pts: i64) -> u64 {
        let seconds = time::to_seconds(pts_to_nanos(pts, self.time_base));
        (seconds * self.info.fps).round().max(0.0) as u64
    }

    fn convert_decoded(&mut self) -> Result<VideoFrame, DecodeError> {
        self.scaler.run(&self.decoded, &mut self.scaled)?;

        let width = self.scaled.width();
        let height = self.scaled.height();
        let stride = self.scaled.stride(0);
        let plane = self.scaled.data(0);
        let row_bytes = width as usize * 4;

        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for y in 0..height as usize {
            let row_start = y * stride;
            data.extend_from_slice(&plane[row_start..row_start + row_bytes]);
        }

        let timestamp = self
            .decoded
            .timestamp()
            .map(|pts| pts_to_nanos(pts, self.time_base))
            .unwrap_or(0);

        Ok(VideoFrame {
            data,
            width,
            height,
            timestamp,
        })
    }
}

impl VideoSource for FfmpegSource {
    fn info(&self) -> &VideoStreamInfo {
        &self.info
    }

    fn read_next_frame(&mut self) -> Result<Option<VideoFrame>, DecodeError> {
        loop {
            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => {
                    if let Some(target) = self.skip_until {
                        let index = self.decoded.timestamp().map(|pts| self.frame_index_of(pts));
                        if matches!(index, Some(i) if i < target) {
                            continue;
                        }
                        self.skip_until = None;
                    }
                    return self.convert_decoded().map(Some);
                }
                Err(ffmpeg::Error::Eof) => return Ok(None),
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => {
                    if !self.feed_decoder()? {
                        return Ok(None);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn seek_to_frame(&mut self, index: u64) -> Result<(), DecodeError> {
        // Input::seek works in AV_TIME_BASE units and lands on the keyframe
        // at or before the target
        let target: Time = time::from_frame_index(index, self.info.fps);
        let timestamp = (target as i128 * i128::from(ffmpeg::ffi::AV_TIME_BASE)
            / time::constants::NANOS_PER_SECOND as i128) as i64;

        self.input
            .seek(timestamp, ..timestamp)
            .map_err(|e| DecodeError::SeekFailed {
                frame: index,
                reason: e.to_string(),
            })?;
        self.decoder.flush();
        self.eof_sent = false;
        self.skip_until = Some(index);

        log::debug!("Seeked {:?} to frame {}", self.path, index);
        Ok(())
    }

    fn release(self) {
        log::info!("Released {:?}", self.path);
        // Codec, scaler and demuxer contexts are freed when dropped
        drop(self);
    }
}

fn rational_to_f64(rational: Rational) -> Option<f64> {
    if rational.numerator() > 0 && rational.denominator() > 0 {
        Some(f64::from(rational.numerator()) / f64::from(rational.denominator()))
    } else {
        None
    }
}

/// Convert a stream timestamp to nanoseconds
/// timestamp * (num/den) = seconds
fn pts_to_nanos(pts: i64, time_base: Rational) -> Time {
    let den = time_base.denominator() as i128;
    if den == 0 {
        return 0;
    }
    // i128 avoids overflow for long streams with fine time bases
    let result = (pts as i128 * time_base.numerator() as i128 * 1_000_000_000i128) / den;
    result as Time
}
