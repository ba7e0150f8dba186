use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::api::FeedError;
use crate::feed::{FeedDetailViewModel, LoadCompletion, PageCompletion, PendingLoad, PendingPage, Phase};
use crate::logging::LogConfig;

pub mod state;

pub use state::{ComposerState, InputMode, LayoutCache, COLUMN_UNITS};

/// How long status messages stay on screen
const MESSAGE_TTL: Duration = Duration::from_secs(3);

/// A fetch the event loop should run off the UI task
pub enum Job {
    Load(PendingLoad),
    Page(PendingPage),
}

impl Job {
    pub async fn run(self) -> Completion {
        match self {
            Job::Load(pending) => Completion::Load(pending.run().await),
            Job::Page(pending) => Completion::Page(pending.run().await),
        }
    }
}

/// A finished fetch on its way back to the UI task
pub enum Completion {
    Load(LoadCompletion),
    Page(PageCompletion),
}

impl Completion {
    /// Whether the issuing view-model still exists
    pub fn is_live(&self) -> bool {
        match self {
            Completion::Load(c) => c.is_live(),
            Completion::Page(c) => c.is_live(),
        }
    }
}

/// Render-relevant parts of the view-model; a change means the view re-rendered
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderKey {
    phase: u8,
    comments: usize,
    /// Advances on every applied page, including one that added no rows
    next_page: u32,
    has_more: bool,
}

/// Terminal front end for one feed detail view
pub struct App {
    pub running: bool,
    pub view_model: FeedDetailViewModel,
    pub input_mode: InputMode,
    pub composer: ComposerState,
    pub comment_list: ListState,
    pub show_help: bool,
    pub show_delete_confirmation: bool,
    pub message: Option<(String, Instant)>,
    pub layout: LayoutCache,
    /// Visible fraction of the sentinel measured by the last render
    pub sentinel_ratio: Option<f32>,
    pub log_config: LogConfig,
    jobs: Vec<Job>,
    last_render_key: Option<RenderKey>,
}

impl App {
    pub fn new(view_model: FeedDetailViewModel, log_config: LogConfig) -> Self {
        Self {
            running: true,
            view_model,
            input_mode: InputMode::Navigation,
            composer: ComposerState::new(),
            comment_list: ListState::default(),
            show_help: false,
            show_delete_confirmation: false,
            message: None,
            layout: LayoutCache::default(),
            sentinel_ratio: None,
            log_config,
            jobs: Vec::new(),
            last_render_key: None,
        }
    }

    /// Queue the initial load
    pub fn start(&mut self) {
        log_debug!(self.log_config, "starting view for post {}", self.view_model.post_id());
        if let Some(pending) = self.view_model.begin_load() {
            self.jobs.push(Job::Load(pending));
        }
    }

    /// Fetches issued since the last call
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    pub fn quit(&mut self) {
        self.running = false;
        self.view_model.teardown();
    }

    pub fn set_message(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), Instant::now()));
    }

    pub fn clear_expired_messages(&mut self) {
        if let Some((_, at)) = &self.message {
            if at.elapsed() >= MESSAGE_TTL {
                self.message = None;
            }
        }
    }

    /// Apply a fetch result that came back from the event loop
    pub fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Load(completion) => {
                if !self.view_model.apply_load(completion) {
                    return;
                }
                match self.view_model.phase().clone() {
                    Phase::Ready => {
                        let select = if self.view_model.comments().is_empty() { None } else { Some(0) };
                        self.comment_list.select(select);
                    }
                    Phase::Failed(FeedError::NotFound(_)) => {
                        self.set_message("This post no longer exists");
                    }
                    Phase::Failed(err) => {
                        let text = format!("{} (press r to retry)", err);
                        self.set_message(text);
                    }
                    _ => {}
                }
            }
            Completion::Page(completion) => {
                let applied = self.view_model.apply_page(completion);
                if applied && matches!(self.view_model.last_error(), Some(FeedError::Network(_))) {
                    self.set_message("Couldn't load more comments. Scroll again to retry.");
                }
            }
        }
    }

    fn render_key(&self) -> RenderKey {
        let phase = match self.view_model.phase() {
            Phase::Idle => 0,
            Phase::Loading => 1,
            Phase::Ready => 2,
            Phase::Failed(_) => 3,
        };
        RenderKey {
            phase,
            comments: self.view_model.comments().len(),
            next_page: self.view_model.pagination().page(),
            has_more: self.view_model.pagination().has_more(),
        }
    }

    /// Called once per drawn frame: re-arm the sentinel if the content
    /// changed and feed it the measured visibility.
    pub fn after_render(&mut self) {
        let key = self.render_key();
        if self.last_render_key.as_ref() != Some(&key) {
            self.view_model.rearm_sentinel();
            self.last_render_key = Some(key);
        }
        if let Some(ratio) = self.sentinel_ratio.take() {
            if let Some(pending) = self.view_model.on_sentinel_visibility(ratio) {
                log_pagination!(self.log_config, "sentinel visible ({:.2}), page {}", ratio, pending.page());
                self.jobs.push(Job::Page(pending));
            }
        }
    }

    // Comment selection

    /// Number of selectable rows: every comment plus the sentinel row
    fn row_count(&self) -> usize {
        self.view_model.comments().len() + 1
    }

    pub fn select_next_comment(&mut self) {
        let last = self.row_count() - 1;
        let next = match self.comment_list.selected() {
            Some(i) => (i + 1).min(last),
            None => 0,
        };
        self.comment_list.select(Some(next));
    }

    pub fn select_previous_comment(&mut self) {
        let prev = match self.comment_list.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.comment_list.select(Some(prev));
    }

    pub fn select_last_row(&mut self) {
        self.comment_list.select(Some(self.row_count() - 1));
    }

    /// The comment under the cursor, if the cursor is on a comment
    pub fn selected_comment(&self) -> Option<&meetup_types::Comment> {
        let index = self.comment_list.selected()?;
        self.view_model.comments().get(index)
    }

    // Composer

    pub fn open_composer(&mut self) {
        if !self.view_model.is_ready() {
            return;
        }
        self.composer.open();
        self.input_mode = InputMode::Typing;
    }

    pub fn close_composer(&mut self) {
        self.composer.close();
        self.input_mode = InputMode::Navigation;
    }

    pub fn submit_composer(&mut self) {
        let content = self.composer.get_content();
        match self.view_model.add_comment(&content) {
            Some(comment) => {
                log_mutation!(self.log_config, "composer posted comment {}", comment.id);
                let index = self.view_model.comments().len() - 1;
                self.comment_list.select(Some(index));
                self.close_composer();
            }
            None => {
                if let Some(text) = self.view_model.last_error().map(|e| e.to_string()) {
                    self.set_message(text);
                }
            }
        }
    }

    // Deletion

    pub fn request_delete_selected(&mut self) {
        match self.selected_comment().map(|c| c.is_mine) {
            Some(true) => self.show_delete_confirmation = true,
            Some(false) => self.set_message("You can only delete your own comments"),
            None => {}
        }
    }

    pub fn confirm_delete(&mut self) {
        self.show_delete_confirmation = false;
        let Some(id) = self.selected_comment().map(|c| c.id) else {
            return;
        };
        if self.view_model.remove_comment(id) {
            let rows = self.row_count();
            if let Some(selected) = self.comment_list.selected() {
                self.comment_list.select(Some(selected.min(rows - 1)));
            }
            self.set_message("Comment deleted");
        }
    }

    pub fn retry(&mut self) {
        if let Some(pending) = self.view_model.retry() {
            log_debug!(self.log_config, "retrying load of post {}", self.view_model.post_id());
            self.message = None;
            self.jobs.push(Job::Load(pending));
        }
    }

    // Input

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        log_gesture!(self.log_config, "key {:?} mode={:?}", key.code, self.input_mode);

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return Ok(());
        }

        if self.input_mode == InputMode::Typing {
            match key.code {
                KeyCode::Esc => self.close_composer(),
                KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => self.submit_composer(),
                _ => {
                    self.composer.textarea.input(key);
                }
            }
            return Ok(());
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Ok(());
        }

        if self.show_delete_confirmation {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.show_delete_confirmation = false;
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.retry(),
            KeyCode::Left | KeyCode::Char('h') => {
                self.view_model.prev_image();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.view_model.next_image();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.view_model.goto_image(index);
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_next_comment(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous_comment(),
            KeyCode::End | KeyCode::Char('G') => self.select_last_row(),
            KeyCode::Char('f') => {
                self.view_model.toggle_like();
            }
            KeyCode::Char('c') | KeyCode::Char('i') => self.open_composer(),
            KeyCode::Char('d') => self.request_delete_selected(),
            _ => {}
        }
        Ok(())
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        log_gesture!(self.log_config, "mouse {:?} at {},{}", mouse.kind, mouse.column, mouse.row);
        let x = f32::from(mouse.column) * COLUMN_UNITS;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if contains(self.layout.carousel, mouse.column, mouse.row) {
                    self.view_model.swipe_start(x);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let swiped = self.view_model.swipe_end(x);
                if !swiped && contains(self.layout.dots, mouse.column, mouse.row) {
                    // Each dot takes two cells
                    let index = usize::from(mouse.column - self.layout.dots.x) / 2;
                    self.view_model.goto_image(index);
                }
            }
            MouseEventKind::ScrollDown => {
                if contains(self.layout.comments, mouse.column, mouse.row) {
                    self.select_next_comment();
                }
            }
            MouseEventKind::ScrollUp => {
                if contains(self.layout.comments, mouse.column, mouse.row) {
                    self.select_previous_comment();
                }
            }
            _ => {}
        }
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}
