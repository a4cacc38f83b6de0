use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::audio::{AudioError, Playback, PlaybackChange, Recorder};
use crate::db::{delete_recording, insert_recording};
use crate::models::{PreloadedSound, RecordedSound};

use super::helpers::{centered_rect, key_hint};
use super::screens::{MixerScreen, Panel};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 4;

/// High-level navigation states. The intro is shown exactly once per run;
/// after the user gets started it is unreachable.
#[derive(Clone, Copy)]
enum Screen {
    Intro,
    Mixer(MixerScreen),
}

/// Fine-grained modes layered over the current screen. An alert blocks all
/// other input until it is dismissed.
enum Mode {
    Normal,
    Alert(String),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI: the sound lists, the
/// playback and recording managers, the persistence connection, and the
/// presentation bits (screen, mode, footer status). Every frame is drawn
/// from this struct alone; handlers only mutate it.
pub struct App {
    conn: Connection,
    preloaded: Vec<PreloadedSound>,
    recorded: Vec<RecordedSound>,
    playback: Playback,
    recorder: Recorder,
    recordings_dir: PathBuf,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        conn: Connection,
        preloaded: Vec<PreloadedSound>,
        recorded: Vec<RecordedSound>,
        recordings_dir: PathBuf,
    ) -> Self {
        Self {
            conn,
            preloaded,
            recorded,
            playback: Playback::new(),
            recorder: Recorder::new(),
            recordings_dir,
            screen: Screen::Intro,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Whether the intro screen is still showing.
    pub fn showing_intro(&self) -> bool {
        matches!(self.screen, Screen::Intro)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// The in-memory recorded-sounds list, mirroring the store.
    pub fn recorded(&self) -> &[RecordedSound] {
        &self.recorded
    }

    /// Dispatch one key press. Returns `true` when the application should
    /// exit. The current mode is swapped out, handled, and written back so
    /// handlers can consume their state payloads by value.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Alert(text) => Self::handle_alert(code, text),
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_alert(code: KeyCode, text: String) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc => Mode::Normal,
            _ => Mode::Alert(text),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Intro => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                    KeyCode::Enter | KeyCode::Char('g') => self.dismiss_intro(),
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Mixer(mut mixer) => {
                let mode = self.handle_mixer_key(code, &mut mixer, exit);
                self.screen = Screen::Mixer(mixer);
                mode
            }
        }
    }

    fn handle_mixer_key(
        &mut self,
        code: KeyCode,
        mixer: &mut MixerScreen,
        exit: &mut bool,
    ) -> Result<Mode> {
        let (preloaded_len, recorded_len) = (self.preloaded.len(), self.recorded.len());
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up => mixer.move_selection(preloaded_len, recorded_len, -1),
            KeyCode::Down => mixer.move_selection(preloaded_len, recorded_len, 1),
            KeyCode::PageUp => mixer.move_selection(preloaded_len, recorded_len, -5),
            KeyCode::PageDown => mixer.move_selection(preloaded_len, recorded_len, 5),
            KeyCode::Home => mixer.select_first(),
            KeyCode::End => mixer.select_last(preloaded_len, recorded_len),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                mixer.toggle_panel()
            }
            KeyCode::Enter => self.activate_selection(mixer),
            KeyCode::Char('r') => {
                if let Some(alert) = self.toggle_recording() {
                    return Ok(Mode::Alert(alert));
                }
            }
            KeyCode::Char('x') | KeyCode::Char('-') => self.delete_selected(mixer),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    /// Leave the intro for the mixer screen. Getting started kicks off
    /// playback of the first bundled clip as a side effect; the intro is
    /// never reachable again afterwards.
    fn dismiss_intro(&mut self) {
        self.screen = Screen::Mixer(MixerScreen::new());
        if let Some(sound) = self.preloaded.first().copied() {
            self.toggle_preloaded(&sound);
        }
    }

    fn activate_selection(&mut self, mixer: &MixerScreen) {
        match mixer.panel {
            Panel::Preloaded => {
                if let Some(sound) = self.preloaded.get(mixer.preloaded_cursor).copied() {
                    self.toggle_preloaded(&sound);
                }
            }
            Panel::Recorded => {
                if let Some(sound) = self.recorded.get(mixer.recorded_cursor).cloned() {
                    self.play_recorded(&sound);
                } else {
                    self.set_status("No recording selected.", StatusKind::Error);
                }
            }
        }
    }

    /// Playback failures stay off the screen: they are logged and the state
    /// is left unchanged, matching the log-and-continue policy everywhere
    /// outside the capture-denied path.
    fn toggle_preloaded(&mut self, sound: &PreloadedSound) {
        match self.playback.toggle_preloaded(sound) {
            Ok(PlaybackChange::Started) => {
                self.set_status(format!("Playing {}.", sound.title), StatusKind::Info)
            }
            Ok(PlaybackChange::Paused) => {
                self.set_status(format!("Paused {}.", sound.title), StatusKind::Info)
            }
            Err(err) => tracing::error!("failed to play {}: {err}", sound.title),
        }
    }

    fn play_recorded(&mut self, sound: &RecordedSound) {
        match self.playback.play_recorded(&sound.sound_uri) {
            Ok(()) => self.set_status(format!("Playing {}.", sound.title), StatusKind::Info),
            Err(err) => tracing::error!("failed to play {}: {err}", sound.title),
        }
    }

    /// Toggle the recording session. Returns the alert text when capture is
    /// denied so the key handler can switch into the blocking alert mode.
    fn toggle_recording(&mut self) -> Option<String> {
        if self.recorder.is_recording() {
            match self.recorder.stop() {
                Ok(Some(uri)) => self.save_recording(uri),
                Ok(None) => {}
                Err(err) => tracing::error!("failed to stop recording: {err}"),
            }
            return None;
        }

        match self.recorder.start(&self.recordings_dir) {
            Ok(()) => {
                self.set_status("Recording from the microphone.", StatusKind::Info);
                None
            }
            Err(AudioError::CaptureDenied) => Some(
                "Audio recording requires a microphone. \
                 Connect a capture device and try again."
                    .to_string(),
            ),
            Err(err) => {
                tracing::error!("failed to start recording: {err}");
                None
            }
        }
    }

    /// Mirror a finished recording into the store, then into the in-memory
    /// list. On persistence failure the file stays on disk but neither side
    /// gains an entry; the failure is logged and nothing is retried.
    fn save_recording(&mut self, uri: String) {
        let title = RecordedSound::numbered_title(self.recorded.len() + 1);
        match insert_recording(&self.conn, &title, &uri) {
            Ok(sound) => {
                self.set_status(format!("Saved {}.", sound.title), StatusKind::Info);
                self.recorded.push(sound);
            }
            Err(err) => tracing::error!("failed to save recording: {err:#}"),
        }
    }

    /// Delete the selected recording from the store, then drop it from the
    /// list by id. The store acts first so a failed delete never leaves a
    /// phantom entry on screen.
    fn delete_selected(&mut self, mixer: &mut MixerScreen) {
        if mixer.panel != Panel::Recorded {
            self.set_status("Deleting applies to recorded sounds.", StatusKind::Error);
            return;
        }
        let Some(sound) = self.recorded.get(mixer.recorded_cursor).cloned() else {
            self.set_status("No recording selected to delete.", StatusKind::Error);
            return;
        };

        match delete_recording(&self.conn, sound.id) {
            Ok(()) => {
                self.recorded.retain(|entry| entry.id != sound.id);
                mixer.clamp(self.preloaded.len(), self.recorded.len());
                self.set_status(format!("Deleted {}.", sound.title), StatusKind::Info);
            }
            Err(err) => tracing::error!("failed to delete {}: {err:#}", sound.title),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        match &self.screen {
            Screen::Intro => self.draw_intro(frame),
            Screen::Mixer(mixer) => self.draw_mixer(frame, mixer),
        }

        if let Mode::Alert(text) = &self.mode {
            self.draw_alert(frame, text);
        }
    }

    fn draw_intro(&self, frame: &mut Frame) {
        let area = centered_rect(70, 60, frame.area());
        let mut enter_hint = vec![Span::raw("Press ")];
        enter_hint.extend(key_hint("Enter", " to get started."));

        let lines = vec![
            Line::from(Span::styled(
                "Sound Mixer",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(
                "Welcome to Sound Mixer! Use this application to create your own music. \
                 It lets you record your own audio and play it back alongside a set of \
                 bundled sounds.",
            ),
            Line::from(""),
            Line::from(enter_hint),
        ];

        let intro = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(intro, area);
    }

    fn draw_mixer(&self, frame: &mut Frame, mixer: &MixerScreen) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(self.preloaded.len() as u16 + 2),
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_heading(frame, chunks[0]);
        self.draw_preloaded_panel(frame, chunks[1], mixer);
        self.draw_recorded_panel(frame, chunks[2], mixer);
        self.draw_record_control(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);
    }

    fn draw_heading(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            "Sound Mixer",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if self.recorded.is_empty() {
            lines.push(Line::from(Span::styled(
                "Record some sounds to build up your library.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn draw_preloaded_panel(&self, frame: &mut Frame, area: Rect, mixer: &MixerScreen) {
        let active = self.playback.active_preloaded();
        let items: Vec<ListItem> = self
            .preloaded
            .iter()
            .map(|sound| {
                let marker = if active == Some(sound.id) {
                    Span::styled("> ", Style::default().fg(Color::Green))
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![marker, Span::raw(sound.title)]))
            })
            .collect();

        let focused = mixer.panel == Panel::Preloaded;
        let list = List::new(items)
            .block(self.panel_block("Preloaded Sounds", focused))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if focused {
            state.select(Some(mixer.preloaded_cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_recorded_panel(&self, frame: &mut Frame, area: Rect, mixer: &MixerScreen) {
        let focused = mixer.panel == Panel::Recorded;
        let block = self.panel_block("Recorded Sounds", focused);

        if self.recorded.is_empty() {
            let placeholder = Paragraph::new("No recorded sounds yet. Press r to record one.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = self
            .recorded
            .iter()
            .map(|sound| {
                ListItem::new(Line::from(vec![
                    Span::raw(sound.title.clone()),
                    Span::styled(
                        format!("  {}", sound.sound_uri),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if focused {
            state.select(Some(mixer.recorded_cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_record_control(&self, frame: &mut Frame, area: Rect) {
        let line = if self.recorder.is_recording() {
            Line::from(vec![
                Span::styled(
                    "* Recording... ",
                    Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("press r to stop."),
            ])
        } else {
            let mut spans = vec![Span::raw("Press ")];
            spans.extend(key_hint("r", " to start recording."));
            Line::from(spans)
        };

        let control = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Recording"),
        );
        frame.render_widget(control, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![self.footer_instructions()];
        if let Some(status) = &self.status {
            lines.push(Line::from(Span::styled(
                status.text.clone(),
                status.kind.style(),
            )));
        }
        let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&'static str, &'static str)] = &[
            ("Up/Down", " select  "),
            ("Tab", " switch panel  "),
            ("Enter", " play  "),
            ("r", " record  "),
            ("x", " delete  "),
            ("q", " quit"),
        ];
        let mut spans = Vec::with_capacity(hints.len() * 2);
        for &(key, action) in hints {
            spans.extend(key_hint(key, action));
        }
        Line::from(spans)
    }

    fn draw_alert(&self, frame: &mut Frame, text: &str) {
        let area = centered_rect(60, 30, frame.area());
        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(text.to_string()),
            Line::from(""),
            Line::from("Press Enter to dismiss."),
        ];
        let alert = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Recording unavailable")
                    .border_style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }

    fn panel_block(&self, title: &'static str, focused: bool) -> Block<'static> {
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{apply_schema, fetch_recordings};
    use crate::models::preloaded_sounds;

    fn test_app() -> App {
        let conn = Connection::open_in_memory().expect("in-memory database");
        apply_schema(&conn).expect("schema");
        App::new(conn, preloaded_sounds(), Vec::new(), std::env::temp_dir())
    }

    fn recorded_panel() -> MixerScreen {
        let mut mixer = MixerScreen::new();
        mixer.toggle_panel();
        mixer
    }

    #[test]
    fn intro_dismisses_exactly_once() {
        let mut app = test_app();
        assert!(app.showing_intro());

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(!app.showing_intro());

        // Further presses act on the mixer screen; the intro stays gone.
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(!app.showing_intro());
    }

    #[test]
    fn fresh_start_has_an_empty_recorded_list() {
        let mut app = test_app();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.recorded().is_empty());
        assert!(!app.is_recording());
    }

    #[test]
    fn saving_a_recording_appends_to_store_and_list() {
        let mut app = test_app();
        app.save_recording("/tmp/take.wav".to_string());

        assert_eq!(app.recorded().len(), 1);
        assert_eq!(app.recorded()[0].title, "Recorded Sound 1");
        assert_eq!(app.recorded()[0].sound_uri, "/tmp/take.wav");

        let rows = fetch_recordings(&app.conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, app.recorded()[0].id);
    }

    #[test]
    fn titles_count_up_with_the_in_memory_list() {
        let mut app = test_app();
        app.save_recording("/tmp/a.wav".to_string());
        app.save_recording("/tmp/b.wav".to_string());

        let titles: Vec<_> = app.recorded().iter().map(|s| s.title.clone()).collect();
        assert_eq!(titles, ["Recorded Sound 1", "Recorded Sound 2"]);
    }

    #[test]
    fn deleting_keeps_the_survivor_with_its_original_id() {
        let mut app = test_app();
        app.save_recording("/tmp/a.wav".to_string());
        app.save_recording("/tmp/b.wav".to_string());
        let second_id = app.recorded()[1].id;

        let mut mixer = recorded_panel();
        app.delete_selected(&mut mixer);

        assert_eq!(app.recorded().len(), 1);
        assert_eq!(app.recorded()[0].id, second_id);
        assert_eq!(app.recorded()[0].title, "Recorded Sound 2");

        let rows = fetch_recordings(&app.conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second_id);
    }

    #[test]
    fn deleting_the_last_entry_pulls_the_cursor_back() {
        let mut app = test_app();
        app.save_recording("/tmp/a.wav".to_string());
        app.save_recording("/tmp/b.wav".to_string());

        let mut mixer = recorded_panel();
        mixer.move_selection(app.preloaded.len(), app.recorded.len(), 1);
        app.delete_selected(&mut mixer);

        assert_eq!(mixer.recorded_cursor, 0);
        assert_eq!(app.recorded().len(), 1);
    }

    #[test]
    fn delete_on_the_preloaded_panel_changes_nothing() {
        let mut app = test_app();
        app.save_recording("/tmp/a.wav".to_string());

        let mut mixer = MixerScreen::new();
        app.delete_selected(&mut mixer);

        assert_eq!(app.recorded().len(), 1);
        assert_eq!(fetch_recordings(&app.conn).unwrap().len(), 1);
    }

    #[test]
    fn alert_blocks_input_until_dismissed() {
        let mut app = test_app();
        app.handle_key(KeyCode::Enter).unwrap();
        app.mode = Mode::Alert("Audio recording requires a microphone.".to_string());

        // Keys other than Enter/Esc leave the alert up and reach nothing.
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert!(matches!(app.mode, Mode::Alert(_)));
        assert!(!app.is_recording());
        assert!(app.recorded().is_empty());

        app.handle_key(KeyCode::Enter).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn quit_is_reachable_from_both_screens() {
        let mut app = test_app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());

        let mut app = test_app();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
