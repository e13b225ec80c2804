use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::{Panel, PreviewView};
use crate::ui::scrollbar;

const WHEEL_STEP_ROWS: f64 = 3.0;

impl PreviewView {
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.search_open {
            self.handle_search_key(key);
            return;
        }

        match (&self.panel, key.code) {
            (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => self.should_quit = true,
            (Panel::Preview, code) => self.handle_preview_key(code),
            (Panel::LargeFileWarning { .. }, KeyCode::Char('p')) => self.start_render(true),
            (Panel::LargeFileWarning { .. }, KeyCode::Char('f')) => self.start_render(false),
            (Panel::LargeFileWarning { .. } | Panel::Unsupported, KeyCode::Char('d')) => {
                self.start_download()
            }
            (Panel::Error(_), KeyCode::Char('r')) => self.reload(),
            (Panel::Error(err), KeyCode::Char('d')) if !err.is_retryable() => {
                self.start_download()
            }
            _ => {}
        }
    }

    fn handle_preview_key(&mut self, code: KeyCode) {
        let page = self.page_rows();
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.surface.scroll_by(1.0),
            KeyCode::Up | KeyCode::Char('k') => self.surface.scroll_by(-1.0),
            KeyCode::PageDown | KeyCode::Char(' ') => self.surface.scroll_by(page),
            KeyCode::PageUp => self.surface.scroll_by(-page),
            KeyCode::Home | KeyCode::Char('g') => {
                self.surface.scroll_to(0.0);
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.surface.scroll_to(f64::MAX);
            }
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char('n') => self.search_next(),
            KeyCode::Char('N') => self.search_previous(),
            KeyCode::Char('w') => {
                self.surface.toggle_word_wrap();
            }
            KeyCode::Char('r') => self.start_render(self.partial),
            KeyCode::Char('p') => self.start_render(!self.partial),
            KeyCode::Char('d') => self.start_download(),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.close_search(),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => self.search_previous(),
            KeyCode::Enter | KeyCode::Down => self.search_next(),
            KeyCode::Up => self.search_previous(),
            KeyCode::Char('c') if alt => self.toggle_search_case_sensitive(),
            KeyCode::Char('r') if alt => self.toggle_search_regex(),
            KeyCode::Char('w') if ctrl => {
                self.search_input.delete_word_backward();
                self.perform_search();
            }
            KeyCode::Char('u') if ctrl => {
                self.search_input.clear();
                self.perform_search();
            }
            KeyCode::Char(ch) if !ctrl && !alt => {
                self.search_input.insert_char(ch);
                self.perform_search();
            }
            KeyCode::Backspace => {
                self.search_input.delete_backward();
                self.perform_search();
            }
            KeyCode::Delete => {
                self.search_input.delete_forward();
                self.perform_search();
            }
            KeyCode::Left => self.search_input.move_left(),
            KeyCode::Right => self.search_input.move_right(),
            KeyCode::Home => self.search_input.move_to_start(),
            KeyCode::End => self.search_input.move_to_end(),
            KeyCode::PageDown => self.surface.scroll_by(self.page_rows()),
            KeyCode::PageUp => self.surface.scroll_by(-self.page_rows()),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(self.panel, Panel::Preview) {
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollDown => self.surface.scroll_by(WHEEL_STEP_ROWS),
            MouseEventKind::ScrollUp => self.surface.scroll_by(-WHEEL_STEP_ROWS),
            MouseEventKind::Down(MouseButton::Left) => {
                self.dragging_scrollbar = self.hits_scrollbar(mouse.column, mouse.row);
                if self.dragging_scrollbar {
                    self.drag_scrollbar_to(mouse.row);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) if self.dragging_scrollbar => {
                self.drag_scrollbar_to(mouse.row);
            }
            MouseEventKind::Up(MouseButton::Left) => self.dragging_scrollbar = false,
            _ => {}
        }
    }

    fn hits_scrollbar(&self, column: u16, row: u16) -> bool {
        self.layout.scrollbar.is_some_and(|area| {
            column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
        })
    }

    fn drag_scrollbar_to(&mut self, row: u16) {
        let (Some(area), Some(layout)) = (self.layout.scrollbar, self.layout.scrollbar_layout)
        else {
            return;
        };

        let click_y = row.saturating_sub(area.y) as f32 + 0.5;
        let offset = scrollbar::offset_from_track_click(click_y, layout.range, layout.metrics);
        self.surface.on_scroll(f64::from(offset));
    }

    fn page_rows(&self) -> f64 {
        f64::from(self.layout.content.height.saturating_sub(1).max(1))
    }
}
