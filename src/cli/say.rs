//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};

use ratatui::crossterm::terminal;
use ratatui::style::Style;
use ratatui::text::Line;

use crate::core::gateway::ModelGateway;
use crate::ui::layout::wrap_spans;
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;

const FALLBACK_WIDTH: usize = 80;

pub async fn run_say(gateway: &ModelGateway, prompt: &str, raw: bool) -> Result<(), Box<dyn Error>> {
    let reply = gateway.respond(prompt, &[]).await?;

    let mut stdout = io::stdout().lock();
    if raw {
        writeln!(stdout, "{}", reply.trim_end())?;
    } else {
        let width = terminal::size()
            .map(|(w, _)| w as usize)
            .unwrap_or(FALLBACK_WIDTH);
        for line in render_for_terminal(&reply, width) {
            writeln!(stdout, "{line}")?;
        }
    }
    stdout.flush()?;
    Ok(())
}

/// Markdown reply as plain terminal lines wrapped to `width`.
pub fn render_for_terminal(markdown: &str, width: usize) -> Vec<Line<'static>> {
    render_markdown(markdown, Style::default(), &Theme::basic())
        .into_iter()
        .flat_map(|line| wrap_spans(&line.spans, width))
        .map(Line::from)
        .collect()
}
