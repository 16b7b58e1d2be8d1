use ratatui::style::{Color, Modifier, Style};

/// Accent blue used for the header, headings, links and the loading dots.
pub const ACCENT: Color = Color::Rgb(0x1a, 0x73, 0xe8);
/// Pale blue behind user bubbles.
pub const USER_BUBBLE_BG: Color = Color::Rgb(0xe8, 0xf0, 0xfe);

#[derive(Debug, Clone)]
pub struct Theme {
    // Chrome
    pub header_style: Style,
    pub header_subtitle_style: Style,
    pub status_style: Style,

    // Bubbles
    pub user_bubble_style: Style,
    pub assistant_bubble_style: Style,
    pub error_text_style: Style,
    pub selected_marker_style: Style,
    pub copy_hint_style: Style,
    pub copied_hint_style: Style,
    pub loading_style: Style,

    // Markdown
    pub heading_style: Style,
    pub link_style: Style,
    pub inline_code_style: Style,
    pub code_block_style: Style,
    pub blockquote_style: Style,
    pub list_marker_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_border_busy_style: Style,
    pub input_text_style: Style,
    pub input_placeholder_style: Style,
}

impl Theme {
    /// Blue-on-white palette of the studio chat page.
    pub fn studio() -> Self {
        let white = Color::Rgb(0xff, 0xff, 0xff);
        let body = Color::Rgb(0x1f, 0x29, 0x37);
        let muted = Color::Rgb(0x9c, 0xa3, 0xaf);

        Theme {
            header_style: Style::default()
                .fg(white)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
            header_subtitle_style: Style::default().fg(Color::Rgb(0xdb, 0xea, 0xfe)).bg(ACCENT),
            status_style: Style::default().fg(Color::Rgb(0x16, 0xa3, 0x4a)),

            user_bubble_style: Style::default().fg(ACCENT).bg(USER_BUBBLE_BG),
            assistant_bubble_style: Style::default().fg(body).bg(white),
            error_text_style: Style::default().fg(Color::Rgb(0xb9, 0x1c, 0x1c)).bg(white),
            selected_marker_style: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            copy_hint_style: Style::default().fg(muted),
            copied_hint_style: Style::default()
                .fg(Color::Rgb(0x16, 0xa3, 0x4a))
                .add_modifier(Modifier::BOLD),
            loading_style: Style::default().fg(ACCENT),

            heading_style: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            link_style: Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::UNDERLINED),
            inline_code_style: Style::default().fg(Color::Rgb(0xbe, 0x18, 0x5d)),
            code_block_style: Style::default().fg(Color::Rgb(0x37, 0x41, 0x51)),
            blockquote_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),
            list_marker_style: Style::default().fg(ACCENT),

            input_border_style: Style::default().fg(ACCENT),
            input_border_busy_style: Style::default().fg(muted),
            input_text_style: Style::default(),
            input_placeholder_style: Style::default().fg(muted),
        }
    }

    /// Palette for terminals without truecolor.
    pub fn basic() -> Self {
        Theme {
            header_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_subtitle_style: Style::default().fg(Color::Gray).bg(Color::Blue),
            status_style: Style::default().fg(Color::Green),

            user_bubble_style: Style::default().fg(Color::Cyan),
            assistant_bubble_style: Style::default(),
            error_text_style: Style::default().fg(Color::Red),
            selected_marker_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            copy_hint_style: Style::default().fg(Color::DarkGray),
            copied_hint_style: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            loading_style: Style::default().fg(Color::Cyan),

            heading_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            link_style: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            inline_code_style: Style::default().fg(Color::Magenta),
            code_block_style: Style::default().fg(Color::Gray),
            blockquote_style: Style::default().fg(Color::DarkGray),
            list_marker_style: Style::default().fg(Color::Cyan),

            input_border_style: Style::default().fg(Color::Cyan),
            input_border_busy_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default(),
            input_placeholder_style: Style::default().fg(Color::DarkGray),
        }
    }

    /// Pick a palette from the `COLORTERM` advertisement.
    pub fn detect() -> Self {
        match std::env::var("COLORTERM") {
            Ok(value) if value == "truecolor" || value == "24bit" => Self::studio(),
            _ => Self::basic(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::studio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn studio_user_bubble_uses_accent_on_pale_blue() {
        let theme = Theme::studio();
        assert_eq!(theme.user_bubble_style.fg, Some(ACCENT));
        assert_eq!(theme.user_bubble_style.bg, Some(USER_BUBBLE_BG));
        assert_eq!(theme.heading_style.fg, Some(ACCENT));
    }

    #[test]
    fn basic_palette_avoids_rgb() {
        let theme = Theme::basic();
        let styles = [
            theme.user_bubble_style,
            theme.heading_style,
            theme.link_style,
            theme.loading_style,
        ];
        for style in styles {
            assert!(!matches!(style.fg, Some(Color::Rgb(..))));
        }
    }
}
