//! Interactive state around a [`ChatSession`]: the compose box, scrolling,
//! bubble selection, and transient status.

use std::time::{Duration, Instant};

use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

use crate::core::message::Message;
use crate::core::session::{ChatSession, PendingRequest};
use crate::ui::layout::{Layout, LayoutConfig, LayoutEngine};
use crate::ui::theme::Theme;
use crate::utils::clipboard::CopyTier;

/// How long the copy confirmation stays on a bubble.
pub const COPIED_FEEDBACK: Duration = Duration::from_secs(2);
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
pub const INPUT_PLACEHOLDER: &str = "Type your message...";

pub struct ChatApp {
    pub session: ChatSession,
    pub theme: Theme,
    pub model: String,
    pub markdown_enabled: bool,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub selected: Option<usize>,
    /// Editor for the compose box; its text is mirrored into `session.input`.
    textarea: TextArea<'static>,
    copied: Option<(usize, Instant)>,
    status: Option<(String, Instant)>,
    loading_since: Option<Instant>,
    pub exit_requested: bool,
}

impl ChatApp {
    pub fn new(model: impl Into<String>, theme: Theme, markdown_enabled: bool) -> Self {
        let mut app = Self {
            session: ChatSession::new(),
            theme,
            model: model.into(),
            markdown_enabled,
            scroll_offset: 0,
            auto_scroll: true,
            selected: None,
            textarea: TextArea::default(),
            copied: None,
            status: None,
            loading_since: None,
            exit_requested: false,
        };
        app.configure_textarea();
        app
    }

    fn configure_textarea(&mut self) {
        self.textarea.set_style(self.theme.input_text_style);
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_placeholder_text(INPUT_PLACEHOLDER);
        self.textarea
            .set_placeholder_style(self.theme.input_placeholder_style);
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    pub fn input_text(&self) -> &str {
        &self.session.input
    }

    /// Replace the compose text, leaving the cursor at its end.
    pub fn set_input(&mut self, text: &str) {
        let lines: Vec<String> = if text.is_empty() {
            Vec::new()
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        self.textarea = TextArea::from(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
        self.sync_input_from_textarea();
    }

    pub fn clear_input(&mut self) {
        self.set_input("");
    }

    /// Apply an edit to the compose box and mirror the result into the session.
    pub fn apply_textarea_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut TextArea<'static>),
    {
        f(&mut self.textarea);
        self.sync_input_from_textarea();
    }

    fn sync_input_from_textarea(&mut self) {
        self.session.input = self.textarea.lines().join("\n");
    }

    pub fn layout(&self, width: u16, now: Instant) -> Layout {
        let cfg = LayoutConfig {
            width: width as usize,
            markdown_enabled: self.markdown_enabled,
            selected: self.selected,
            copied: self.copied_index(now),
            loading_elapsed: self.loading_elapsed(now),
        };
        LayoutEngine::layout_messages(self.session.messages(), &self.theme, &cfg)
    }

    fn loading_elapsed(&self, now: Instant) -> Option<Duration> {
        if !self.session.is_loading() {
            return None;
        }
        let since = self.loading_since.unwrap_or(now);
        Some(now.saturating_duration_since(since))
    }

    /// Submit the compose buffer; see [`ChatSession::submit_input`].
    pub fn submit(&mut self, now: Instant) -> Option<PendingRequest> {
        let pending = self.session.submit_input()?;
        self.clear_input();
        self.loading_since = Some(now);
        self.auto_scroll = true;
        Some(pending)
    }

    /// Apply a finished request. Returns false when it was discarded.
    pub fn apply_reply(
        &mut self,
        pending: &PendingRequest,
        result: Result<String, crate::core::gateway::GatewayError>,
    ) -> bool {
        let applied = self.session.complete(pending, result);
        if !self.session.is_loading() {
            self.loading_since = None;
        }
        applied
    }

    pub fn new_chat(&mut self) {
        self.session.new_chat();
        self.clear_input();
        self.selected = None;
        self.copied = None;
        self.loading_since = None;
        self.scroll_offset = 0;
        self.auto_scroll = true;
        self.set_status("New chat", Instant::now());
    }

    /// Move the selection to an older (`backwards`) or newer assistant
    /// message, wrapping around. With nothing selected the newest is picked.
    pub fn cycle_selection(&mut self, backwards: bool) {
        let assistant: Vec<usize> = self
            .session
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_assistant())
            .map(|(i, _)| i)
            .collect();
        if assistant.is_empty() {
            self.selected = None;
            return;
        }

        let current = self
            .selected
            .and_then(|sel| assistant.iter().position(|&i| i == sel));
        let next = match current {
            None => assistant.len() - 1,
            Some(pos) if backwards => (pos + assistant.len() - 1) % assistant.len(),
            Some(pos) => (pos + 1) % assistant.len(),
        };
        self.selected = Some(assistant[next]);
        self.auto_scroll = false;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Message the copy key acts on: the selection, else the latest reply.
    pub fn copy_target(&self) -> Option<(usize, &Message)> {
        let index = self
            .selected
            .or_else(|| self.session.last_assistant_index())?;
        self.session
            .messages()
            .get(index)
            .filter(|m| m.is_assistant())
            .map(|m| (index, m))
    }

    pub fn record_copy(&mut self, index: usize, outcome: Result<CopyTier, String>, now: Instant) {
        match outcome {
            Ok(tier) => {
                self.copied = Some((index, now));
                self.set_status(format!("Copied as {tier}"), now);
            }
            Err(err) => self.set_status(format!("Copy failed: {err}"), now),
        }
    }

    pub fn copied_index(&self, now: Instant) -> Option<usize> {
        self.copied
            .filter(|(_, at)| now.saturating_duration_since(*at) < COPIED_FEEDBACK)
            .map(|(index, _)| index)
    }

    pub fn set_status(&mut self, message: impl Into<String>, now: Instant) {
        self.status = Some((message.into(), now));
    }

    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < STATUS_TIMEOUT)
            .map(|(msg, _)| msg.as_str())
    }

    /// True while something on screen changes without input.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.session.is_loading() || self.copied_index(now).is_some() || self.status(now).is_some()
    }

    pub fn scroll_up(&mut self, lines: u16, max_offset: u16) {
        if self.auto_scroll {
            self.scroll_offset = max_offset;
            self.auto_scroll = false;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16, max_offset: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max_offset);
        if self.scroll_offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
    }

    /// Offset to render with, given the largest valid offset.
    pub fn effective_scroll(&self, max_offset: u16) -> u16 {
        if self.auto_scroll {
            max_offset
        } else {
            self.scroll_offset.min(max_offset)
        }
    }

    /// Scroll so the selected message's first line is visible.
    pub fn reveal_selected(&mut self, layout: &Layout, viewport: u16) {
        let Some(index) = self.selected else {
            return;
        };
        let Some(span) = layout.message_spans.get(index) else {
            return;
        };
        let top = span.start.min(u16::MAX as usize) as u16;
        let max_offset = max_scroll(layout.lines.len(), viewport);
        if top < self.scroll_offset || top >= self.scroll_offset.saturating_add(viewport) {
            self.scroll_offset = top.min(max_offset);
        }
        self.auto_scroll = false;
    }
}

pub fn max_scroll(total_lines: usize, viewport: u16) -> u16 {
    let total = total_lines.min(u16::MAX as usize) as u16;
    total.saturating_sub(viewport)
}
