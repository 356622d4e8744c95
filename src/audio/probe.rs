use std::path::Path;

use anyhow::{ensure, Context, Result};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::time::Millis;

/// Duration of the first audio track in `path`.
///
/// Uses the container's frame count when it has one, otherwise decodes the
/// track and counts frames.
pub fn probe_duration<P: AsRef<Path>>(path: P) -> Result<Millis> {
    let path = path.as_ref();

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probe_result = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;
    let mut format = probe_result.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate not specified in audio file")?;
    ensure!(sample_rate > 0, "Audio file reports a zero sample rate");
    let n_frames = track.codec_params.n_frames;

    let frames = match n_frames {
        Some(frames) => frames,
        None => {
            debug!(path = %path.display(), "no frame count in container, decoding");
            count_frames(&mut *format)?
        }
    };

    let seconds = frames as f64 / sample_rate as f64;
    Millis::from_secs_f64(seconds)
        .with_context(|| format!("Audio duration out of range for {}", path.display()))
}

fn count_frames(format: &mut dyn FormatReader) -> Result<u64> {
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found in file")?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut frames = 0u64;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(err).context("Failed to read packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .context("Failed to decode audio packet")?;
        frames += decoded.frames() as u64;
    }
    Ok(frames)
}
