//! Markdown → HTML document for rich clipboard writes.

use pulldown_cmark::{html, Options, Parser};

use crate::ui::bidi::BubbleStyle;

/// Render `markdown` as HTML body content.
pub fn markdown_to_html_fragment(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Standalone HTML document whose wrapper carries the bubble's direction
/// and font stack, so pasted text keeps its layout.
pub fn markdown_to_html_document(markdown: &str) -> String {
    let style = BubbleStyle::for_content(markdown);
    let body = markdown_to_html_fragment(markdown);
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>\
         <div dir=\"{}\" style=\"font-family: {};\">{}</div></body></html>",
        style.direction.as_html(),
        style.font_family,
        body.trim_end()
    )
}
