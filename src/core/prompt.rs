//! Prompt formatting and reply extraction
//!
//! The model is asked to continue after an `AI:` cue with a JSON object
//! holding its reply under `response`. Local models often get that wrong, so
//! extraction degrades to the first line of whatever came back.

use serde_json::Value;

use crate::conversation::Message;

/// Number of trailing messages included in a prompt
pub const PROMPT_WINDOW: usize = 5;

/// Marks where the model continues
pub const AI_CUE: &str = "AI:";

/// Render the prompt for one reply
pub fn format_prompt(instruction: &str, history: &[Message], target_length: usize) -> String {
    let window = &history[history.len().saturating_sub(PROMPT_WINDOW)..];

    let mut prompt = format!(
        "{}\n\nThe last few messages of the conversation are:\n",
        instruction
    );
    for message in window {
        prompt.push_str(&format!("{}: {}\n", message.role, message.content));
    }
    prompt.push_str(&format!(
        "\nPlease respond to this last message. Aim for {} to {} characters. ",
        target_length / 2,
        target_length
    ));
    prompt.push_str(
        "Keep it conversational without emojis or hashtags. \
         Respond in JSON format with a 'response' key.\n\n",
    );
    prompt.push_str(AI_CUE);

    tracing::info!(%prompt, "formatted prompt");
    prompt
}

/// Recover the reply text from raw model output. Never fails.
pub fn extract_response(raw: &str) -> String {
    let candidate = match raw.split_once(AI_CUE) {
        Some((_, after)) => after.trim(),
        None => raw.trim(),
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => match object.get("response") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        _ => first_line(candidate),
    }
}

fn first_line(text: &str) -> String {
    text.split('\n').next().unwrap_or("").trim().to_string()
}
