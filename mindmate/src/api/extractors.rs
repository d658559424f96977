use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::MindmateError;

/// `axum::Json` whose rejections render as the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(MindmateError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for MindmateError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> MindmateError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                MindmateError::Validation(format!("Missing required field: {field}"))
            } else {
                MindmateError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            MindmateError::Validation(format!("JSON syntax error: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => MindmateError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(_) => {
            MindmateError::Internal("Failed to read request body".to_string())
        }
        _ => MindmateError::Validation(rejection.to_string()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
