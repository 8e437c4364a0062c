use axum::{Json, body::Bytes};

use carewhistle_types::api::ChatbotReply;

const EMPTY_REPLY: &str = "Please say something.";
const FILE_REPORT_QUESTION: &str = "how do i file a report?";
const FILE_REPORT_REPLY: &str = "Go to the Make a Report page";

/// POST /chatbot: Canned help for reporters. The body is read raw so that
/// malformed JSON gets a reply instead of a rejection.
pub async fn chatbot(body: Bytes) -> Json<ChatbotReply> {
    Json(ChatbotReply {
        reply: reply_to(&body),
    })
}

pub fn reply_to(body: &[u8]) -> String {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    let message = match message.as_deref().map(str::trim) {
        None | Some("") => return EMPTY_REPLY.to_string(),
        Some(m) => m,
    };

    if message.to_lowercase() == FILE_REPORT_QUESTION {
        return FILE_REPORT_REPLY.to_string();
    }
    format!(
        "For whistleblowing questions, please consult our guidelines. You said: {}",
        message
    )
}
