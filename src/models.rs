// =============================================================================
// models.rs - WHAT GOES IN, WHAT COMES OUT
// =============================================================================
//
// The wire shapes of the one operation this engine exists for:
//
//   in:  { "urls": ["https://...", ...] }
//   out: { "code": 0, "msg": "", "data": { "contents": ["...", ...] } }
//
// `contents` carries no URLs. Once a page is text, nobody remembers where it
// came from, and a page that failed simply isn't there.
// =============================================================================

use serde::{Deserialize, Serialize};

/// The inbound payload. A missing or `null` `urls` field is an empty batch,
/// not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchRequest {
    #[serde(default)]
    pub urls: Option<Vec<String>>,
}

impl FetchRequest {
    pub fn into_urls(self) -> Vec<String> {
        self.urls.unwrap_or_default()
    }
}

/// Payload half of the response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseData {
    pub contents: Vec<String>,
}

/// The response envelope shared by success and failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResponse {
    pub code: i32,
    pub msg: String,
    pub data: ResponseData,
}

impl BatchResponse {
    /// Success is the zero-valued envelope plus whatever text survived.
    pub fn success(contents: Vec<String>) -> Self {
        Self {
            code: 0,
            msg: String::new(),
            data: ResponseData { contents },
        }
    }

    /// Failure keeps `contents` an empty array so clients never see `null`.
    pub fn failure(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: ResponseData::default(),
        }
    }
}
