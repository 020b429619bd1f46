//! The response envelope returned by every collector.
//!
//! An envelope is `{"statusCode": <int>, "body": "<json text>"}`. The body is
//! always a JSON object encoded as a string, so the invoking framework can
//! forward it untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn new(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }

    pub fn ok(body: &Value) -> Self {
        Self::new(200, body)
    }

    /// A 404 carrying only a message; "nothing to collect" is not an error.
    pub fn not_found(message: &str) -> Self {
        Self::new(404, &json!({ "message": message }))
    }

    pub fn error(message: &str, error: &impl Display) -> Self {
        Self::new(
            500,
            &json!({
                "message": message,
                "error": error.to_string(),
            }),
        )
    }

    /// Decode the body back into a JSON value.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
