use crate::core::message::Message;

/// Appended to every prompt; the API is asked for markdown output.
pub const MARKDOWN_INSTRUCTION: &str =
    "Please provide a response using markdown formatting where appropriate.";

/// Flatten prior turns plus the new prompt into one single-shot prompt.
///
/// With history, each turn becomes `"<Role>: <content>"` on its own line,
/// followed by the new user turn and an assistant cue carrying the
/// instruction. Without history the prompt is sent bare with the instruction.
pub fn build_prompt(prompt: &str, history: &[Message]) -> String {
    if history.is_empty() {
        return format!("{prompt}\n\n{MARKDOWN_INSTRUCTION}");
    }

    let context = history
        .iter()
        .map(|msg| format!("{}: {}", msg.role.label(), msg.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{context}\n\nUser: {prompt}\n\nAssistant: {MARKDOWN_INSTRUCTION}")
}
