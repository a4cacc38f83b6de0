//! Screen-scoped selection state. The mixer screen keeps one cursor per
//! panel so switching focus back and forth does not lose the user's place.

/// Which list currently owns the selection cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    Preloaded,
    Recorded,
}

/// Selection state for the mixer screen. Movement is clamped against the
/// list lengths the caller passes in, so a cursor can never point past the
/// end of its list even right after a delete.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MixerScreen {
    pub(crate) panel: Panel,
    pub(crate) preloaded_cursor: usize,
    pub(crate) recorded_cursor: usize,
}

impl MixerScreen {
    pub(crate) fn new() -> Self {
        Self {
            panel: Panel::Preloaded,
            preloaded_cursor: 0,
            recorded_cursor: 0,
        }
    }

    pub(crate) fn toggle_panel(&mut self) {
        self.panel = match self.panel {
            Panel::Preloaded => Panel::Recorded,
            Panel::Recorded => Panel::Preloaded,
        };
    }

    pub(crate) fn move_selection(
        &mut self,
        preloaded_len: usize,
        recorded_len: usize,
        offset: isize,
    ) {
        let (cursor, len) = self.focused_cursor(preloaded_len, recorded_len);
        if len == 0 {
            *cursor = 0;
            return;
        }
        let max = len as isize - 1;
        *cursor = (*cursor as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        match self.panel {
            Panel::Preloaded => self.preloaded_cursor = 0,
            Panel::Recorded => self.recorded_cursor = 0,
        }
    }

    pub(crate) fn select_last(&mut self, preloaded_len: usize, recorded_len: usize) {
        let (cursor, len) = self.focused_cursor(preloaded_len, recorded_len);
        *cursor = len.saturating_sub(1);
    }

    /// Pull both cursors back into range after the lists change size.
    pub(crate) fn clamp(&mut self, preloaded_len: usize, recorded_len: usize) {
        self.preloaded_cursor = self.preloaded_cursor.min(preloaded_len.saturating_sub(1));
        self.recorded_cursor = self.recorded_cursor.min(recorded_len.saturating_sub(1));
    }

    fn focused_cursor(
        &mut self,
        preloaded_len: usize,
        recorded_len: usize,
    ) -> (&mut usize, usize) {
        match self.panel {
            Panel::Preloaded => (&mut self.preloaded_cursor, preloaded_len),
            Panel::Recorded => (&mut self.recorded_cursor, recorded_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_clamps_to_list_bounds() {
        let mut screen = MixerScreen::new();
        screen.move_selection(3, 0, -1);
        assert_eq!(screen.preloaded_cursor, 0);
        screen.move_selection(3, 0, 10);
        assert_eq!(screen.preloaded_cursor, 2);
    }

    #[test]
    fn empty_list_pins_the_cursor_at_zero() {
        let mut screen = MixerScreen::new();
        screen.panel = Panel::Recorded;
        screen.move_selection(3, 0, 1);
        assert_eq!(screen.recorded_cursor, 0);
    }

    #[test]
    fn panels_keep_independent_cursors() {
        let mut screen = MixerScreen::new();
        screen.move_selection(3, 2, 2);
        screen.toggle_panel();
        screen.move_selection(3, 2, 1);
        assert_eq!(screen.preloaded_cursor, 2);
        assert_eq!(screen.recorded_cursor, 1);
        screen.toggle_panel();
        assert_eq!(screen.panel, Panel::Preloaded);
    }

    #[test]
    fn clamp_recovers_after_a_shrinking_list() {
        let mut screen = MixerScreen::new();
        screen.panel = Panel::Recorded;
        screen.move_selection(3, 2, 1);
        assert_eq!(screen.recorded_cursor, 1);
        screen.clamp(3, 1);
        assert_eq!(screen.recorded_cursor, 0);
    }
}
