// =============================================================================
// extractor.rs - MARKUP IN, WORDS OUT
// =============================================================================
//
// The coordinator doesn't care how a page becomes text, only that the answer
// is either some text or nothing. An empty string means "nothing"; the unit
// that gets one drops its URL exactly as if the fetch had failed.
// =============================================================================

use std::io::Cursor;

use tracing::debug;

/// Turns a fetched body into plain text. Must be callable from many fetch
/// units at once.
pub trait TextExtractor: Send + Sync {
    /// Returns the readable text of `body`, or an empty string when there is
    /// none to be had.
    fn extract(&self, body: &[u8]) -> String;
}

/// `html2text`-backed extractor. Handles real HTML, tag soup, and plain text
/// that never had any markup to begin with.
#[derive(Debug, Clone)]
pub struct HtmlTextExtractor {
    width: usize,
}

/// Narrower than this and html2text starts refusing to lay out lists and
/// block quotes at all.
const MIN_WIDTH: usize = 20;

impl HtmlTextExtractor {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(MIN_WIDTH) }
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, body: &[u8]) -> String {
        if body.is_empty() {
            return String::new();
        }

        match html2text::from_read(Cursor::new(body), self.width) {
            // Pages made of nothing but scripts and whitespace render as a few
            // blank lines. That is not text.
            Ok(text) if text.trim().is_empty() => String::new(),
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, bytes = body.len(), "html2text gave up on a body");
                String::new()
            }
        }
    }
}
