use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

/// The envelope every successful response is wrapped in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    /// Mirrors the HTTP status code.
    pub code: u16,
    pub result: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub debug: Option<Value>,
}

/// Body of `GET /me`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub id: String,
    pub role: i64,
    pub is_reviewer: bool,
}
