use std::fs::File;
use std::io::{BufReader, Cursor};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::AudioError;
use crate::models::PreloadedSound;

/// The single tracked preloaded-sound playback. Recorded-sound playbacks are
/// detached and never get a handle.
struct PlaybackHandle {
    sink: Sink,
    sound_id: i64,
}

/// What a preloaded-sound toggle did, so the caller can word its feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackChange {
    Started,
    Paused,
}

/// Playback manager over the process-wide output stream. The stream is
/// opened lazily on the first play request, so constructing the application
/// (and running tests against it) never touches audio hardware.
pub struct Playback {
    output: Option<(OutputStream, OutputStreamHandle)>,
    current: Option<PlaybackHandle>,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            output: None,
            current: None,
        }
    }

    /// Id of the preloaded sound currently tracked as playing, if any. A
    /// sink that ran to the end of its clip no longer counts.
    pub fn active_preloaded(&self) -> Option<i64> {
        self.current
            .as_ref()
            .filter(|handle| !handle.sink.empty())
            .map(|handle| handle.sound_id)
    }

    /// Toggle playback of a bundled clip. Pressing the clip that is already
    /// playing releases it (pause semantics; the next toggle restarts the
    /// clip from the beginning). Pressing any other clip, or a finished one,
    /// releases whatever sink was tracked and starts a fresh playback.
    pub fn toggle_preloaded(
        &mut self,
        sound: &PreloadedSound,
    ) -> Result<PlaybackChange, AudioError> {
        if let Some(active) = self.current.take() {
            let was_playing = active.sound_id == sound.id && !active.sink.empty();
            // Stopping releases the old sink even when a different clip takes
            // over, so the previous playback never lingers under the new one.
            active.sink.stop();
            if was_playing {
                return Ok(PlaybackChange::Paused);
            }
        }

        let handle = self.output_handle()?;
        let sink = Sink::try_new(&handle)?;
        sink.append(Decoder::new(Cursor::new(sound.clip))?);
        self.current = Some(PlaybackHandle {
            sink,
            sound_id: sound.id,
        });
        Ok(PlaybackChange::Started)
    }

    /// Play a recorded file fire-and-forget. The detached sink runs to the
    /// end of the clip on its own; overlapping recorded playbacks are
    /// allowed and cannot be stopped through this interface.
    pub fn play_recorded(&mut self, uri: &str) -> Result<(), AudioError> {
        let handle = self.output_handle()?;
        let file = File::open(uri)?;
        let sink = Sink::try_new(&handle)?;
        sink.append(Decoder::new(BufReader::new(file))?);
        sink.detach();
        Ok(())
    }

    fn output_handle(&mut self) -> Result<OutputStreamHandle, AudioError> {
        if let Some((_, handle)) = &self.output {
            return Ok(handle.clone());
        }
        let (stream, handle) = OutputStream::try_default()?;
        self.output = Some((stream, handle.clone()));
        Ok(handle)
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::preloaded_sounds;

    #[test]
    fn nothing_is_active_before_any_toggle() {
        let playback = Playback::new();
        assert_eq!(playback.active_preloaded(), None);
    }

    #[test]
    #[ignore = "Requires audio hardware"]
    fn toggle_starts_then_pauses_the_same_clip() {
        let sounds = preloaded_sounds();
        let mut playback = Playback::new();

        let change = playback.toggle_preloaded(&sounds[0]).unwrap();
        assert_eq!(change, PlaybackChange::Started);
        assert_eq!(playback.active_preloaded(), Some(sounds[0].id));

        let change = playback.toggle_preloaded(&sounds[0]).unwrap();
        assert_eq!(change, PlaybackChange::Paused);
        assert_eq!(playback.active_preloaded(), None);
    }

    #[test]
    #[ignore = "Requires audio hardware"]
    fn switching_clips_replaces_the_tracked_handle() {
        let sounds = preloaded_sounds();
        let mut playback = Playback::new();

        playback.toggle_preloaded(&sounds[0]).unwrap();
        let change = playback.toggle_preloaded(&sounds[1]).unwrap();
        assert_eq!(change, PlaybackChange::Started);
        assert_eq!(playback.active_preloaded(), Some(sounds[1].id));
    }
}
