//! Width-aware layout of the conversation into chat bubbles.

use std::time::Duration;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::bidi::BubbleStyle;
use super::markdown::{render_markdown, render_plain};
use super::theme::Theme;
use crate::core::message::Message;

/// Bubbles take at most this share of the transcript width, in percent.
const BUBBLE_MAX_PERCENT: usize = 80;
const MIN_BUBBLE_WIDTH: usize = 12;
/// Columns reserved left of every bubble for the selection marker.
pub const GUTTER_WIDTH: usize = 2;
const SELECTED_MARKER: &str = "▌ ";
const COPY_HINT: &str = "Ctrl+Y copy";
const COPIED_HINT: &str = "✓ Copied";

/// Layout configuration for one pass.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub width: usize,
    pub markdown_enabled: bool,
    /// Message index of the selected assistant bubble.
    pub selected: Option<usize>,
    /// Message index whose copy confirmation is showing.
    pub copied: Option<usize>,
    /// Time since the loading indicator appeared; `None` when idle.
    pub loading_elapsed: Option<Duration>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 80,
            markdown_enabled: true,
            selected: None,
            copied: None,
            loading_elapsed: None,
        }
    }
}

/// Mapping for a single message's contribution to the flattened line stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLineSpan {
    pub start: usize,
    pub len: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub lines: Vec<Line<'static>>,
    pub message_spans: Vec<MessageLineSpan>,
}

pub struct LayoutEngine;

impl LayoutEngine {
    pub fn layout_messages(messages: &[Message], theme: &Theme, cfg: &LayoutConfig) -> Layout {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut message_spans = Vec::with_capacity(messages.len());
        let bubble_area = cfg.width.saturating_sub(GUTTER_WIDTH).max(1);

        for (index, msg) in messages.iter().enumerate() {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let start = lines.len();
            let style = BubbleStyle::for_content(&msg.content);
            let fill = bubble_fill(msg, theme);
            let content = if msg.is_assistant() && cfg.markdown_enabled && !msg.is_error() {
                render_markdown(&msg.content, fill, theme)
            } else {
                render_plain(&msg.content, fill)
            };

            let footer = if msg.is_assistant() {
                Some(copy_footer(index, cfg, theme))
            } else {
                None
            };

            // User bubbles sit on the trailing edge; right-to-left text mirrors that.
            let align_right = msg.role.is_user() != style.is_rtl();
            let bubble = BubbleShape {
                fill,
                align_right,
                rtl: style.is_rtl(),
                area_width: bubble_area,
            };
            let marker = if cfg.selected == Some(index) {
                Span::styled(SELECTED_MARKER, theme.selected_marker_style)
            } else {
                Span::raw(" ".repeat(GUTTER_WIDTH))
            };
            for mut row in bubble.layout(content, footer) {
                row.spans.insert(0, marker.clone());
                lines.push(row);
            }
            message_spans.push(MessageLineSpan {
                start,
                len: lines.len() - start,
            });
        }

        if let Some(elapsed) = cfg.loading_elapsed {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let fill = theme.assistant_bubble_style;
            let dots = Line::from(Span::styled(
                loading_dots(elapsed),
                fill.patch(theme.loading_style),
            ));
            let bubble = BubbleShape {
                fill,
                align_right: false,
                rtl: false,
                area_width: bubble_area,
            };
            for mut row in bubble.layout(vec![dots], None) {
                row.spans.insert(0, Span::raw(" ".repeat(GUTTER_WIDTH)));
                lines.push(row);
            }
        }

        Layout {
            lines,
            message_spans,
        }
    }
}

fn bubble_fill(msg: &Message, theme: &Theme) -> Style {
    if msg.role.is_user() {
        theme.user_bubble_style
    } else if msg.is_error() {
        theme.error_text_style
    } else {
        theme.assistant_bubble_style
    }
}

fn copy_footer(index: usize, cfg: &LayoutConfig, theme: &Theme) -> Span<'static> {
    if cfg.copied == Some(index) {
        Span::styled(COPIED_HINT, theme.copied_hint_style)
    } else if cfg.selected == Some(index) {
        Span::styled(COPY_HINT, theme.selected_marker_style)
    } else {
        Span::styled(COPY_HINT, theme.copy_hint_style)
    }
}

/// Three bouncing dots, each trailing the previous by 200ms over a 1s cycle.
pub fn loading_dots(elapsed: Duration) -> String {
    let ms = elapsed.as_millis() as u64;
    (0..3u64)
        .map(|i| {
            let phase = (ms + 1000 - i * 200) % 1000;
            if phase < 500 {
                "●"
            } else {
                "·"
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct BubbleShape {
    fill: Style,
    align_right: bool,
    rtl: bool,
    area_width: usize,
}

impl BubbleShape {
    fn max_width(&self) -> usize {
        let preferred = self.area_width * BUBBLE_MAX_PERCENT / 100;
        preferred.max(MIN_BUBBLE_WIDTH).min(self.area_width)
    }

    /// Wrap `content` into a padded bubble with an optional footer row under
    /// its trailing corner.
    fn layout(&self, content: Vec<Line<'static>>, footer: Option<Span<'static>>) -> Vec<Line<'static>> {
        let inner_max = self.max_width().saturating_sub(2).max(1);
        let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
        for line in content {
            rows.extend(wrap_spans(&line.spans, inner_max));
        }
        if rows.is_empty() {
            rows.push(Vec::new());
        }

        let footer_width = footer.as_ref().map(|s| s.content.width()).unwrap_or(0);
        let inner = rows
            .iter()
            .map(|row| spans_width(row))
            .max()
            .unwrap_or(0)
            .max(footer_width.saturating_sub(2))
            .min(inner_max);
        let bubble_width = inner + 2;
        let outer_pad = if self.align_right {
            self.area_width.saturating_sub(bubble_width)
        } else {
            0
        };

        let mut out = Vec::with_capacity(rows.len() + 1);
        for row in rows {
            let slack = inner.saturating_sub(spans_width(&row));
            let mut spans = Vec::with_capacity(row.len() + 5);
            if outer_pad > 0 {
                spans.push(Span::raw(" ".repeat(outer_pad)));
            }
            spans.push(Span::styled(" ", self.fill));
            if self.rtl && slack > 0 {
                spans.push(Span::styled(" ".repeat(slack), self.fill));
            }
            spans.extend(
                row.into_iter()
                    .map(|span| Span::styled(span.content, self.fill.patch(span.style))),
            );
            if !self.rtl && slack > 0 {
                spans.push(Span::styled(" ".repeat(slack), self.fill));
            }
            spans.push(Span::styled(" ", self.fill));
            out.push(Line::from(spans));
        }

        if let Some(hint) = footer {
            // The copy affordance sits at the trailing corner of the bubble,
            // which is the left corner for right-to-left text.
            let lead = if self.rtl {
                outer_pad
            } else {
                outer_pad + bubble_width.saturating_sub(footer_width)
            };
            let mut spans = Vec::with_capacity(2);
            if lead > 0 {
                spans.push(Span::raw(" ".repeat(lead)));
            }
            spans.push(hint);
            out.push(Line::from(spans));
        }
        out
    }
}

pub fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| s.content.width()).sum()
}

/// Greedy word wrap of styled spans to `width` columns. Words longer than
/// the width are split at grapheme boundaries; whitespace at the start of a
/// continuation row is dropped.
pub fn wrap_spans(spans: &[Span<'static>], width: usize) -> Vec<Vec<Span<'static>>> {
    let width = width.max(1);
    let mut rows: Vec<Vec<Span<'static>>> = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut row_width = 0usize;
    let mut continuation = false;

    for span in spans {
        for token in span.content.split_inclusive(' ') {
            let visible = token.trim_end_matches(' ').width();
            if row_width > 0 && row_width + visible > width {
                rows.push(finish_row(std::mem::take(&mut row)));
                row_width = 0;
                continuation = true;
            }
            if row_width == 0 && continuation && token.trim().is_empty() {
                continue;
            }
            if visible > width {
                for grapheme in token.graphemes(true) {
                    let w = grapheme.width();
                    if row_width > 0 && row_width + w > width {
                        rows.push(finish_row(std::mem::take(&mut row)));
                        row_width = 0;
                        continuation = true;
                    }
                    if row_width == 0 && continuation && grapheme == " " {
                        continue;
                    }
                    push_piece(&mut row, grapheme, span.style);
                    row_width += w;
                }
                continue;
            }
            push_piece(&mut row, token, span.style);
            row_width += token.width();
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(finish_row(row));
    }
    rows
}

fn push_piece(row: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match row.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => row.push(Span::styled(text.to_string(), style)),
    }
}

/// Trailing spaces never count toward a row's width.
fn finish_row(mut row: Vec<Span<'static>>) -> Vec<Span<'static>> {
    while let Some(last) = row.last_mut() {
        let trimmed = last.content.trim_end_matches(' ').len();
        if trimmed == 0 {
            row.pop();
            continue;
        }
        last.content.to_mut().truncate(trimmed);
        break;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn layout(messages: &[Message], width: usize) -> Layout {
        let cfg = LayoutConfig {
            width,
            ..LayoutConfig::default()
        };
        LayoutEngine::layout_messages(messages, &Theme::studio(), &cfg)
    }

    #[test]
    fn wrap_breaks_at_word_boundaries() {
        let rows = wrap_spans(&[Span::raw("the quick brown fox")], 10);
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(texts, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let rows = wrap_spans(&[Span::raw("abcdefghij")], 4);
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_counts_display_width() {
        let rows = wrap_spans(&[Span::raw("你好 世界")], 4);
        let texts: Vec<String> = rows.iter().map(|r| text(r)).collect();
        assert_eq!(texts, vec!["你好", "世界"]);
    }

    #[test]
    fn wrap_keeps_leading_indent_of_first_row() {
        let rows = wrap_spans(&[Span::raw("  code")], 20);
        assert_eq!(text(&rows[0]), "  code");
    }

    #[test]
    fn empty_line_yields_one_empty_row() {
        let rows = wrap_spans(&[], 10);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());
    }

    #[test]
    fn user_bubble_is_right_aligned() {
        let out = layout(&[Message::user("hi")], 40);
        let line = &out.lines[0];
        assert!(spans_width(&line.spans) <= 40);
        assert!(text(&line.spans).ends_with(" hi "));
        assert!(text(&line.spans).starts_with("    "));
    }

    #[test]
    fn assistant_bubble_is_left_aligned_with_copy_hint() {
        let out = layout(&[Message::assistant("hello")], 40);
        // Bubble widens to fit the copy hint underneath.
        assert_eq!(text(&out.lines[0].spans), "   hello     ");
        assert!(text(&out.lines[1].spans).ends_with(COPY_HINT));
        assert_eq!(out.message_spans, vec![MessageLineSpan { start: 0, len: 2 }]);
    }

    #[test]
    fn rtl_flips_alignment() {
        let user = layout(&[Message::user("مرحبا")], 40);
        assert_eq!(text(&user.lines[0].spans), "   مرحبا ");

        let assistant = layout(&[Message::assistant("مرحبا")], 40);
        assert!(text(&assistant.lines[0].spans).starts_with("          "));
        // Copy hint moves to the left corner of the bubble.
        let hint_row = text(&assistant.lines[1].spans);
        assert!(hint_row.trim_start().starts_with(COPY_HINT));
    }

    #[test]
    fn bubbles_wrap_within_eighty_percent() {
        let long = "word ".repeat(40);
        let out = layout(&[Message::user(long.trim())], 52);
        for line in &out.lines {
            let bubble: usize = line
                .spans
                .iter()
                .filter(|s| s.style.bg.is_some())
                .map(|s| s.content.width())
                .sum();
            assert!(bubble <= 40, "bubble width {bubble}");
        }
        assert!(out.lines.len() > 1);
    }

    #[test]
    fn messages_are_separated_and_spans_recorded() {
        let out = layout(&[Message::user("q"), Message::assistant("a")], 40);
        assert_eq!(out.message_spans[0], MessageLineSpan { start: 0, len: 1 });
        assert!(out.lines[1].spans.is_empty());
        assert_eq!(out.message_spans[1].start, 2);
    }

    #[test]
    fn selected_bubble_gets_marker_and_copied_hint() {
        let cfg = LayoutConfig {
            width: 40,
            selected: Some(0),
            copied: Some(0),
            ..LayoutConfig::default()
        };
        let out = LayoutEngine::layout_messages(&[Message::assistant("a")], &Theme::studio(), &cfg);
        assert_eq!(out.lines[0].spans[0].content, SELECTED_MARKER);
        assert!(text(&out.lines[1].spans).ends_with(COPIED_HINT));
    }

    #[test]
    fn error_messages_are_not_markdown_rendered() {
        let out = layout(&[Message::assistant("Error: **raw**")], 60);
        assert!(text(&out.lines[0].spans).contains("**raw**"));
    }

    #[test]
    fn loading_indicator_appends_a_bubble() {
        let cfg = LayoutConfig {
            width: 40,
            loading_elapsed: Some(Duration::ZERO),
            ..LayoutConfig::default()
        };
        let out = LayoutEngine::layout_messages(&[Message::user("q")], &Theme::studio(), &cfg);
        let last = text(&out.lines.last().unwrap().spans);
        assert!(last.contains('●'));
        assert_eq!(out.message_spans.len(), 1);
    }

    #[test]
    fn loading_dots_animate() {
        assert_eq!(loading_dots(Duration::ZERO), "● · ·");
        assert_eq!(loading_dots(Duration::from_millis(450)), "● ● ●");
        assert_eq!(loading_dots(Duration::from_millis(600)), "· ● ●");
    }
}
