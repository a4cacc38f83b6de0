use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use hound::{SampleFormat as WavSampleFormat, WavSpec, WavWriter};

use super::AudioError;

type SharedWriter = Arc<Mutex<Option<WavWriter<BufWriter<File>>>>>;

/// Live capture state: the cpal input stream plus the writer its callback
/// feeds. Dropping the stream ends the callbacks; the writer is finalized
/// afterwards so the WAV header carries the real sample count.
struct CaptureSession {
    stream: Stream,
    writer: SharedWriter,
    path: PathBuf,
}

/// Idle/Active recording state machine. At most one capture session exists
/// at a time; `start` while Active and `stop` while Idle are no-ops, so the
/// caller can key its toggle on [`Recorder::is_recording`] alone.
pub struct Recorder {
    session: Option<CaptureSession>,
}

impl Recorder {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Begin capturing from the default input device into a timestamped WAV
    /// file under `dir`. A host without a usable capture device maps to
    /// [`AudioError::CaptureDenied`]; any failure leaves the recorder Idle
    /// with no session retained.
    pub fn start(&mut self, dir: &Path) -> Result<(), AudioError> {
        if self.session.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(AudioError::CaptureDenied)?;
        let config = device.default_input_config()?;

        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "recording-{}.wav",
            Local::now().format("%Y%m%d-%H%M%S-%3f")
        ));

        // The device's native channel count and sample rate are preserved;
        // samples are normalized to 16-bit PCM on the way in.
        let spec = WavSpec {
            channels: config.channels(),
            sample_rate: config.sample_rate().0,
            bits_per_sample: 16,
            sample_format: WavSampleFormat::Int,
        };
        let writer: SharedWriter = Arc::new(Mutex::new(Some(WavWriter::create(&path, spec)?)));

        let stream = match config.sample_format() {
            SampleFormat::I16 => {
                let writer = Arc::clone(&writer);
                device.build_input_stream(
                    &config.into(),
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        write_samples(&writer, data, |sample| sample)
                    },
                    log_stream_error,
                    None,
                )?
            }
            SampleFormat::F32 => {
                let writer = Arc::clone(&writer);
                device.build_input_stream(
                    &config.into(),
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        write_samples(&writer, data, |sample| {
                            (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                        })
                    },
                    log_stream_error,
                    None,
                )?
            }
            format => return Err(AudioError::UnsupportedFormat(format)),
        };
        stream.play()?;

        self.session = Some(CaptureSession {
            stream,
            writer,
            path,
        });
        Ok(())
    }

    /// Stop the active session, finalize the WAV file, and hand back its
    /// path for persistence. Returns `None` when no session was active.
    pub fn stop(&mut self) -> Result<Option<String>, AudioError> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };

        // Tear down the stream first so no callback races the finalize.
        drop(session.stream);

        let mut guard = lock_writer(&session.writer);
        if let Some(wav) = guard.take() {
            wav.finalize()?;
        }

        Ok(Some(session.path.to_string_lossy().into_owned()))
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Append one callback buffer to the shared writer. On a write failure the
/// writer is dropped so later callbacks become no-ops instead of logging
/// once per buffer for the rest of the session.
fn write_samples<T: Copy>(writer: &SharedWriter, data: &[T], convert: impl Fn(T) -> i16) {
    let mut guard = lock_writer(writer);
    let Some(mut wav) = guard.take() else {
        return;
    };

    for sample in data {
        if let Err(err) = wav.write_sample(convert(*sample)) {
            tracing::error!("failed to append capture samples: {err}");
            return;
        }
    }

    *guard = Some(wav);
}

fn lock_writer(writer: &SharedWriter) -> std::sync::MutexGuard<'_, Option<WavWriter<BufWriter<File>>>> {
    match writer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn log_stream_error(err: cpal::StreamError) {
    tracing::error!("capture stream error: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let mut recorder = Recorder::new();
        assert!(!recorder.is_recording());
        assert!(recorder.stop().unwrap().is_none());
    }

    #[test]
    #[ignore = "Requires audio hardware"]
    fn start_then_stop_produces_a_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = Recorder::new();

        recorder.start(dir.path()).unwrap();
        assert!(recorder.is_recording());
        thread::sleep(Duration::from_millis(200));

        let path = recorder.stop().unwrap().expect("session was active");
        assert!(!recorder.is_recording());

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
    }

    #[test]
    #[ignore = "Requires audio hardware"]
    fn start_while_active_keeps_the_existing_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = Recorder::new();

        recorder.start(dir.path()).unwrap();
        recorder.start(dir.path()).unwrap();

        let first = recorder.stop().unwrap();
        assert!(first.is_some());
        assert!(recorder.stop().unwrap().is_none());
    }
}
