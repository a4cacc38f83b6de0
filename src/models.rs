//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so the other layers can
//! focus on presentation, audio, and persistence logic.

use std::fmt;

/// A sound clip bundled with the application at build time. The clip bytes
/// are embedded in the binary, so a preloaded sound is always available and
/// never touches the persistence layer.
#[derive(Debug, Clone, Copy)]
pub struct PreloadedSound {
    /// Static id assigned in [`preloaded_sounds`]. Playback toggling keys on
    /// this id to decide whether a key press pauses or restarts the clip.
    pub id: i64,
    /// User-facing display label.
    pub title: &'static str,
    /// Embedded audio data in a format the playback decoder understands.
    pub clip: &'static [u8],
}

impl fmt::Display for PreloadedSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// In-memory representation of a captured recording. The struct mirrors rows
/// in the `sounds` table; `id` is the store-assigned rowid, kept around
/// because the delete flow bubbles it back to the persistence layer.
#[derive(Debug, Clone)]
pub struct RecordedSound {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// Generated display title, see [`RecordedSound::numbered_title`].
    pub title: String,
    /// Filesystem path of the finalized audio file.
    pub sound_uri: String,
}

impl RecordedSound {
    /// Derive the display title for the recording occupying slot `position`
    /// (1-based). Titles come from the in-memory count at the time of
    /// recording, so they are not unique across deletions and must never be
    /// used as a lookup key; the id serves that purpose.
    pub fn numbered_title(position: usize) -> String {
        format!("Recorded Sound {position}")
    }
}

impl fmt::Display for RecordedSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// The fixed catalog of bundled clips, assembled fresh at process start.
/// Preloaded ids live in their own space; they never mix with the rowids of
/// recorded sounds, so no global id allocation is needed.
pub fn preloaded_sounds() -> Vec<PreloadedSound> {
    vec![
        PreloadedSound {
            id: 1,
            title: "Sound 1",
            clip: include_bytes!("../assets/sfx/chime.wav"),
        },
        PreloadedSound {
            id: 2,
            title: "Sound 2",
            clip: include_bytes!("../assets/sfx/sweep.wav"),
        },
        PreloadedSound {
            id: 3,
            title: "Sound 3",
            clip: include_bytes!("../assets/sfx/pulse.wav"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_titles_follow_position() {
        assert_eq!(RecordedSound::numbered_title(1), "Recorded Sound 1");
        assert_eq!(RecordedSound::numbered_title(12), "Recorded Sound 12");
    }

    #[test]
    fn catalog_has_three_distinct_clips() {
        let sounds = preloaded_sounds();
        assert_eq!(sounds.len(), 3);
        for (index, sound) in sounds.iter().enumerate() {
            assert_eq!(sound.id, index as i64 + 1);
            assert!(!sound.clip.is_empty());
        }
    }

    #[test]
    fn catalog_clips_are_riff_wav() {
        for sound in preloaded_sounds() {
            assert_eq!(&sound.clip[..4], b"RIFF");
            assert_eq!(&sound.clip[8..12], b"WAVE");
        }
    }
}
