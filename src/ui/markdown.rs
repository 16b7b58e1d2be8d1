//! Markdown → styled terminal lines for assistant bubbles.
//!
//! Output lines are logical lines: wrapping to the bubble width happens later
//! in [`crate::ui::layout`].

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";
const LIST_INDENT: &str = "  ";
const RULE_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render `content` as markdown, using `base` for plain text.
pub fn render_markdown(content: &str, base: Style, theme: &Theme) -> Vec<Line<'static>> {
    MarkdownRenderer::new(content, base, theme).render()
}

/// Split `content` on newlines without interpreting markup.
pub fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    content
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    /// Destination URLs of open links, with the text seen so far.
    link_stack: Vec<(String, String)>,
    quote_depth: usize,
    in_code_block: bool,
    needs_blank: bool,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(content: &'a str, base: Style, theme: &'a Theme) -> Self {
        Self {
            content,
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            link_stack: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            needs_blank: false,
        }
    }

    fn render(mut self) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(self.content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => {
                    if self.in_code_block {
                        self.push_code_text(&text);
                    } else {
                        self.push_text(&text, self.current_style());
                    }
                }
                Event::Code(code) => {
                    let style = self.current_style().patch(self.theme.inline_code_style);
                    self.push_text(&code, style);
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.push_text(html.trim_end_matches('\n'), self.current_style());
                }
                Event::SoftBreak => self.push_text(" ", self.current_style()),
                Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.begin_block();
                    self.current.push(Span::styled(
                        "─".repeat(RULE_WIDTH),
                        self.theme.blockquote_style,
                    ));
                    self.flush_line();
                    self.end_block();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.current
                        .push(Span::styled(marker, self.theme.list_marker_style));
                }
                _ => {}
            }
        }
        self.flush_line();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if self.list_stack.is_empty() {
                    self.begin_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.begin_block();
                let style = self.current_style().patch(self.heading_style(level));
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.begin_block();
                self.quote_depth += 1;
                let style = self.current_style().patch(self.theme.blockquote_style);
                self.style_stack.push(style);
            }
            Tag::CodeBlock(kind) => {
                self.begin_block();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.current.push(Span::styled(
                            lang.to_string(),
                            self.theme.copy_hint_style,
                        ));
                        self.flush_line();
                    }
                }
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.begin_block();
                } else {
                    self.flush_line();
                }
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                if depth > 0 {
                    self.current.push(Span::raw(LIST_INDENT.repeat(depth)));
                }
                self.current
                    .push(Span::styled(marker, self.theme.list_marker_style));
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } => {
                let style = self.current_style().patch(self.theme.link_style);
                self.style_stack.push(style);
                self.link_stack.push((dest_url.to_string(), String::new()));
            }
            Tag::Table(_) => self.begin_block(),
            Tag::TableCell => {
                if !self.current.is_empty() {
                    self.current
                        .push(Span::styled(" │ ", self.theme.blockquote_style));
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.end_block();
                }
            }
            TagEnd::Heading(_) => {
                self.style_stack.pop();
                self.flush_line();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.style_stack.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush_line();
                self.end_block();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.end_block();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link => {
                self.style_stack.pop();
                if let Some((url, text)) = self.link_stack.pop() {
                    if !url.is_empty() && text != url {
                        self.current.push(Span::styled(
                            format!(" ({url})"),
                            self.theme.copy_hint_style,
                        ));
                    }
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => self.flush_line(),
            TagEnd::Table => {
                self.flush_line();
                self.end_block();
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.theme.heading_style.add_modifier(Modifier::UNDERLINED),
            _ => self.theme.heading_style,
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        for (_, seen) in self.link_stack.iter_mut() {
            seen.push_str(text);
        }
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_code_text(&mut self, text: &str) {
        let style = self.theme.code_block_style;
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            let last = parts.peek().is_none();
            if last && part.is_empty() {
                break;
            }
            if self.current.is_empty() {
                self.current.push(Span::raw(CODE_INDENT));
            }
            self.current.push(Span::styled(part.to_string(), style));
            if !last {
                self.flush_line();
            }
        }
    }

    /// Separate a new top-level block from the previous one.
    fn begin_block(&mut self) {
        self.flush_line();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn end_block(&mut self) {
        self.needs_blank = true;
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        if self.quote_depth > 0 {
            spans.push(Span::styled(
                QUOTE_PREFIX.repeat(self.quote_depth),
                self.theme.blockquote_style,
            ));
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }
}
