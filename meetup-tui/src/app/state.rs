use ratatui::layout::Rect;
use tui_textarea::TextArea;

/// Swipe distance units per terminal column
pub const COLUMN_UNITS: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Navigation, // Browsing content, shortcuts active
    Typing,     // In the comment composer, shortcuts disabled
}

/// Comment composer backed by tui-textarea
pub struct ComposerState {
    pub open: bool,
    pub textarea: TextArea<'static>,
}

impl ComposerState {
    pub fn new() -> Self {
        Self {
            open: false,
            textarea: TextArea::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close and discard whatever was typed
    pub fn close(&mut self) {
        self.open = false;
        self.textarea = TextArea::default();
    }

    pub fn get_content(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn char_count(&self) -> usize {
        self.get_content().chars().count()
    }
}

impl Default for ComposerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen areas from the last frame, used to hit-test mouse events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutCache {
    pub carousel: Rect,
    /// Row of indicator dots under the image
    pub dots: Rect,
    pub comments: Rect,
}
