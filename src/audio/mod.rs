//! Audio capability adapters: playback through the shared output mixer and
//! microphone capture to WAV files.

mod playback;
mod recorder;

pub use playback::{Playback, PlaybackChange};
pub use recorder::Recorder;

use thiserror::Error;

/// Failures raised by the playback and capture adapters. Callers log these
/// and continue; nothing here is retried or escalated, with the one
/// exception that [`AudioError::CaptureDenied`] is surfaced to the user as a
/// blocking alert because recording cannot proceed without a device.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no capture device is available")]
    CaptureDenied,
    #[error("audio output is unavailable: {0}")]
    Output(#[from] rodio::StreamError),
    #[error("failed to open playback sink: {0}")]
    Sink(#[from] rodio::PlayError),
    #[error("failed to decode sound clip: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
    #[error("failed to read capture config: {0}")]
    CaptureConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build capture stream: {0}")]
    CaptureStream(#[from] cpal::BuildStreamError),
    #[error("failed to start capture stream: {0}")]
    CaptureStart(#[from] cpal::PlayStreamError),
    #[error("unsupported capture sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
    #[error("failed to write recording: {0}")]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
