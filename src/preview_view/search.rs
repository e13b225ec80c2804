use super::{Panel, PreviewView};

impl PreviewView {
    pub(super) fn open_search(&mut self) {
        if self.search_open || !matches!(self.panel, Panel::Preview) {
            return;
        }

        self.search_open = true;
        self.search_input.clear();
    }

    pub(super) fn close_search(&mut self) {
        if !self.search_open {
            return;
        }

        self.search_open = false;
        self.search_input.clear();
        self.renderer.clear_search();
    }

    pub(super) fn search_next(&mut self) {
        if self.renderer.search_results().is_empty() {
            return;
        }

        self.renderer.next_match();
        self.scroll_to_current_match();
    }

    pub(super) fn search_previous(&mut self) {
        if self.renderer.search_results().is_empty() {
            return;
        }

        self.renderer.previous_match();
        self.scroll_to_current_match();
    }

    fn scroll_to_current_match(&mut self) {
        self.renderer.reveal_current_match();
    }

    /// Re-runs the query in the search bar. The first hit at or below the
    /// top of the viewport becomes current, so typing doesn't jump
    /// backwards past what is on screen.
    pub(super) fn perform_search(&mut self) {
        let query = self.search_input.text().to_string();
        let count = self.renderer.search(&query);
        if count == 0 {
            return;
        }

        let top_line = self.surface.state().first_visible_line();
        self.renderer.jump_to_nearest(top_line);
        self.scroll_to_current_match();
    }

    pub(super) fn toggle_search_case_sensitive(&mut self) {
        self.renderer.toggle_case_sensitive();
        self.scroll_to_current_match();
    }

    pub(super) fn toggle_search_regex(&mut self) {
        self.renderer.toggle_regex_mode();
        self.scroll_to_current_match();
    }
}
