//! Input helpers for the compose box.

/// Sanitize typed or pasted text so it cannot corrupt the TUI.
///
/// Tabs become four spaces, carriage returns become newlines, and every other
/// control character is dropped.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' => sanitized.push('\n'),
            '\n' => sanitized.push(c),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
