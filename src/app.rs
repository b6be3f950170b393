use std::time::{Duration, Instant};

use crate::error::{LifecycleError, ValidationError};
use crate::events::AppEvent;
use crate::formatter::{self, Block};
use crate::models::{
    AppConfig, GeneratedBlog, SavedBlog, ThemeConfig, TOPIC_MAX_CHARS, TOPIC_MIN_CHARS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Compose,
    Library,
}

/// The single display mode currently visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Idle,
    Generating,
    ResultShown,
    Saving,
    ErrorShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    /// Only success alerts expire on their own.
    pub expires_at: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Regenerate { topic: String },
    Delete { id: i64, topic: String },
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        match self {
            Self::Regenerate { .. } => {
                "This will generate a new blog post for the same topic. Continue?".to_string()
            }
            Self::Delete { topic, .. } => format!("Delete \"{topic}\"? This cannot be undone."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Neutral,
    Valid,
    Invalid,
}

#[derive(Debug)]
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub exit_pending: bool,
    pub show_help: bool,
    pub show_html: bool,
    pub input_buffer: String,
    pub current_blog: Option<GeneratedBlog>,
    pub rendered: Vec<Block>,
    pub rendered_html: String,
    pub generating: bool,
    pub saving: bool,
    pub library_loading: bool,
    pub alert: Option<Alert>,
    pub saved_ack_until: Option<Instant>,
    pub confirm: Option<Confirmation>,
    pub library: Vec<SavedBlog>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub backend_url: String,
    pub backend_online: Option<bool>,
    pub theme: ThemeConfig,
    alert_timeout: Duration,
    saved_ack: Duration,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            mode: AppMode::Compose,
            should_quit: false,
            exit_pending: false,
            show_help: false,
            show_html: false,
            input_buffer: String::new(),
            current_blog: None,
            rendered: Vec::new(),
            rendered_html: String::new(),
            generating: false,
            saving: false,
            library_loading: false,
            alert: None,
            saved_ack_until: None,
            confirm: None,
            library: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            backend_url: config.backend_url.clone(),
            backend_online: None,
            theme: config.theme.clone(),
            alert_timeout: Duration::from_secs(config.alert_timeout_secs),
            saved_ack: Duration::from_secs(config.saved_ack_secs),
        }
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    pub const fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub const fn toggle_html(&mut self) {
        self.show_html = !self.show_html;
    }

    pub const fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    pub const fn scroll_to_bottom(&mut self) {
        // Clamped by the renderer
        self.scroll_offset = usize::MAX;
    }

    pub fn ui_mode(&self) -> UiMode {
        if self.generating {
            UiMode::Generating
        } else if self.saving {
            UiMode::Saving
        } else if self
            .alert
            .as_ref()
            .is_some_and(|a| a.kind != AlertKind::Success)
        {
            UiMode::ErrorShown
        } else if self.current_blog.is_some() {
            UiMode::ResultShown
        } else {
            UiMode::Idle
        }
    }

    /// Live character count for the topic input.
    pub fn topic_counter(&self) -> (usize, CounterState) {
        let count = self.input_buffer.trim().chars().count();
        let state = if count > TOPIC_MAX_CHARS {
            CounterState::Invalid
        } else if count >= TOPIC_MIN_CHARS {
            CounterState::Valid
        } else {
            CounterState::Neutral
        };
        (count, state)
    }

    pub fn show_alert(&mut self, kind: AlertKind, message: impl Into<String>, now: Instant) {
        let expires_at = (kind == AlertKind::Success).then(|| now + self.alert_timeout);
        self.alert = Some(Alert {
            kind,
            message: message.into(),
            expires_at,
        });
    }

    pub fn show_error(&mut self, error: &LifecycleError, now: Instant) {
        let kind = if error.is_warning() {
            AlertKind::Warning
        } else {
            AlertKind::Error
        };
        self.show_alert(kind, error.to_string(), now);
    }

    pub fn show_validation(&mut self, error: ValidationError, now: Instant) {
        self.show_error(&LifecycleError::Validation(error), now);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Enter the generating state: alerts and the previous result are hidden.
    pub fn begin_generate(&mut self) {
        self.generating = true;
        self.alert = None;
        self.current_blog = None;
        self.rendered.clear();
        self.rendered_html.clear();
        self.scroll_offset = 0;
    }

    pub const fn begin_save(&mut self) {
        self.saving = true;
    }

    pub const fn begin_library(&mut self) {
        self.library_loading = true;
    }

    pub fn can_save(&self) -> bool {
        !self.saving && self.saved_ack_until.is_none()
    }

    pub const fn save_label(&self) -> &'static str {
        if self.saving {
            "Saving..."
        } else if self.saved_ack_until.is_some() {
            "Saved!"
        } else {
            "Save"
        }
    }

    /// Ask for confirmation before regenerating the current topic.
    pub fn request_regenerate(&mut self) -> Result<(), ValidationError> {
        let topic = self.input_buffer.trim();
        if topic.is_empty() {
            return Err(ValidationError::EmptyTopic);
        }
        self.confirm = Some(Confirmation::Regenerate {
            topic: topic.to_string(),
        });
        Ok(())
    }

    pub fn request_delete(&mut self) {
        if let Some(blog) = self.selected_blog() {
            self.confirm = Some(Confirmation::Delete {
                id: blog.id,
                topic: blog.topic.clone(),
            });
        }
    }

    pub fn selected_blog(&self) -> Option<&SavedBlog> {
        self.library.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.library.len() {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    pub const fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    pub fn switch_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.scroll_offset = 0;
    }

    /// Expire success alerts and the save acknowledgement.
    pub fn tick(&mut self, now: Instant) {
        if self
            .alert
            .as_ref()
            .and_then(|a| a.expires_at)
            .is_some_and(|at| now >= at)
        {
            self.alert = None;
        }
        if self.saved_ack_until.is_some_and(|at| now >= at) {
            self.saved_ack_until = None;
        }
    }

    /// Apply a resolved request. Busy flags drop here unless the event is an
    /// in-flight rejection, which means the first request is still running.
    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        match &event {
            AppEvent::GenerateFinished(result) => {
                if !is_in_flight(result) {
                    self.generating = false;
                }
            }
            AppEvent::SaveFinished(result) => {
                if !is_in_flight(result) {
                    self.saving = false;
                }
            }
            AppEvent::LibraryLoaded(result) => {
                if !is_in_flight(result) {
                    self.library_loading = false;
                }
            }
            AppEvent::BlogDeleted { result, .. } => {
                if !is_in_flight(result) {
                    self.library_loading = false;
                }
            }
            AppEvent::BackendStatus(_) => {}
        }

        match event {
            AppEvent::GenerateFinished(Ok(blog)) => {
                self.rendered = formatter::parse_blocks(&blog.content);
                self.rendered_html = formatter::to_html(&self.rendered);
                self.current_blog = Some(blog);
                self.scroll_to_top();
                self.show_alert(AlertKind::Success, "Blog generated successfully!", now);
            }
            AppEvent::GenerateFinished(Err(error)) => {
                // An in-flight rejection leaves the running generation alone
                if !matches!(error, LifecycleError::InFlight(_)) {
                    self.current_blog = None;
                    self.rendered.clear();
                    self.rendered_html.clear();
                }
                self.show_error(&error, now);
            }
            AppEvent::SaveFinished(Ok(message)) => {
                self.show_alert(AlertKind::Success, message, now);
                self.saved_ack_until = Some(now + self.saved_ack);
            }
            AppEvent::SaveFinished(Err(error)) => self.show_error(&error, now),
            AppEvent::LibraryLoaded(Ok(blogs)) => {
                self.library = blogs;
                self.selected = self.selected.min(self.library.len().saturating_sub(1));
            }
            AppEvent::LibraryLoaded(Err(error)) => self.show_error(&error, now),
            AppEvent::BlogDeleted { id, result } => match result {
                Ok(message) => {
                    self.library.retain(|b| b.id != id);
                    self.selected = self.selected.min(self.library.len().saturating_sub(1));
                    self.show_alert(AlertKind::Success, message, now);
                }
                Err(error) => self.show_error(&error, now),
            },
            AppEvent::BackendStatus(online) => self.backend_online = Some(online),
        }
    }
}

fn is_in_flight<T>(result: &Result<T, LifecycleError>) -> bool {
    matches!(result, Err(LifecycleError::InFlight(_)))
}
