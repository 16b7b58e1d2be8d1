use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::state::{max_scroll, ChatApp};

pub const HEADER_HEIGHT: u16 = 2;
const STATUS_HEIGHT: u16 = 1;
const MAX_INPUT_ROWS: u16 = 5;

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatAreas {
    pub header: Rect,
    pub transcript: Rect,
    pub status: Rect,
    pub input: Rect,
}

pub fn chat_areas(area: Rect, input: &str) -> ChatAreas {
    let rows = input_rows(input);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUS_HEIGHT),
            Constraint::Length(rows + 2), // +2 for borders
        ])
        .split(area);
    ChatAreas {
        header: chunks[0],
        transcript: chunks[1],
        status: chunks[2],
        input: chunks[3],
    }
}

/// One row per compose line; the editor scrolls beyond the cap.
fn input_rows(input: &str) -> u16 {
    let lines = input.split('\n').count().min(MAX_INPUT_ROWS as usize) as u16;
    lines.max(1)
}

pub fn ui(f: &mut Frame, app: &ChatApp) {
    let now = Instant::now();
    let areas = chat_areas(f.area(), app.input_text());

    render_header(f, app, areas.header);

    let layout = app.layout(areas.transcript.width, now);
    let max_offset = max_scroll(layout.lines.len(), areas.transcript.height);
    let scroll = app.effective_scroll(max_offset);
    f.render_widget(
        Paragraph::new(layout.lines).scroll((scroll, 0)),
        areas.transcript,
    );

    if let Some(status) = app.status(now) {
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                status.to_string(),
                app.theme.status_style,
            ))),
            areas.status,
        );
    }

    render_input(f, app, areas.input);
}

fn render_header(f: &mut Frame, app: &ChatApp, area: Rect) {
    let theme = &app.theme;
    let width = area.width as usize;
    let title = format!(" Gemini Flash · {}", app.model);
    let action = "Ctrl+N New Chat ";
    let gap = width.saturating_sub(title.chars().count() + action.chars().count());
    let subtitle = format!(" flashchat v{}", env!("CARGO_PKG_VERSION"));
    let sub_gap = width.saturating_sub(subtitle.chars().count());

    let lines = vec![
        Line::from(vec![
            Span::styled(title, theme.header_style),
            Span::styled(" ".repeat(gap), theme.header_style),
            Span::styled(action, theme.header_style),
        ]),
        Line::from(vec![
            Span::styled(subtitle, theme.header_subtitle_style),
            Span::styled(" ".repeat(sub_gap), theme.header_subtitle_style),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_input(f: &mut Frame, app: &ChatApp, area: Rect) {
    let theme = &app.theme;
    let busy = app.session.is_loading();
    let (border_style, title) = if busy {
        (theme.input_border_busy_style, " Waiting for reply… ")
    } else {
        (
            theme.input_border_style,
            " Enter send · Tab select · Ctrl+Y copy · Ctrl+C quit ",
        )
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, border_style));

    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(app.textarea(), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::state::INPUT_PLACEHOLDER;
    use crate::ui::theme::Theme;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(app: &ChatApp, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..height {
            for x in 0..width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn empty_chat_shows_header_and_placeholder() {
        let app = ChatApp::new("gemini-1.5-flash", Theme::studio(), true);
        let screen = draw(&app, 70, 12);
        assert!(screen.contains("Gemini Flash · gemini-1.5-flash"));
        assert!(screen.contains("Ctrl+N New Chat"));
        assert!(screen.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn conversation_and_loading_are_rendered() {
        let mut app = ChatApp::new("m", Theme::studio(), true);
        app.set_input("hello there");
        let pending = app.submit(Instant::now()).unwrap();
        let screen = draw(&app, 60, 14);
        assert!(screen.contains("hello there"));
        assert!(screen.contains("Waiting for reply"));

        app.apply_reply(&pending, Ok("**bold** answer".into()));
        let screen = draw(&app, 60, 14);
        assert!(screen.contains("bold answer"));
        assert!(!screen.contains("**bold**"));
        assert!(screen.contains("Ctrl+Y copy"));
    }

    #[test]
    fn markdown_toggle_shows_raw_source() {
        let mut app = ChatApp::new("m", Theme::studio(), false);
        app.set_input("q");
        let pending = app.submit(Instant::now()).unwrap();
        app.apply_reply(&pending, Ok("**bold**".into()));
        assert!(draw(&app, 60, 14).contains("**bold**"));
    }

    #[test]
    fn transcript_follows_the_newest_message() {
        let mut app = ChatApp::new("m", Theme::studio(), true);
        for i in 0..12 {
            app.set_input(&format!("question {i}"));
            let pending = app.submit(Instant::now()).unwrap();
            app.apply_reply(&pending, Ok(format!("answer {i}")));
        }
        let screen = draw(&app, 60, 16);
        assert!(screen.contains("answer 11"));
        assert!(!screen.contains("question 0 "));
    }

    #[test]
    fn draft_is_shown_while_waiting() {
        let mut app = ChatApp::new("m", Theme::studio(), true);
        app.set_input("first");
        app.submit(Instant::now()).unwrap();
        app.set_input("next draft");
        let screen = draw(&app, 60, 14);
        assert!(screen.contains("next draft"));
        assert!(!screen.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn input_area_grows_with_content() {
        let area = Rect::new(0, 0, 20, 20);
        assert_eq!(chat_areas(area, "").input.height, 3);
        assert_eq!(chat_areas(area, "a\nb\nc").input.height, 5);
        assert_eq!(chat_areas(area, &"x\n".repeat(20)).input.height, 7);
    }
}
