//! Vision module - floor-plan room extraction through a vision model

pub mod ai;

pub use ai::backend::{PageImage, VisionBackend};
pub use ai::command_backend::{image_data_url, CommandBackend};
pub use ai::prompts::{build_page_prompt, build_user_instruction, ROOM_EXTRACTION_PROMPT};

use smeta_types::{Error, Hints, PageResult, Result};
use tracing::debug;

/// Progress callback for long-running extraction
pub type ProgressCallback = Box<dyn Fn(&str) + Send>;

/// Turns one page image into a raw page result
pub trait PageExtractor {
    fn extract(&self, image: &PageImage, hints: Option<&Hints>) -> Result<PageResult>;
}

impl<T: PageExtractor + ?Sized> PageExtractor for &T {
    fn extract(&self, image: &PageImage, hints: Option<&Hints>) -> Result<PageResult> {
        (**self).extract(image, hints)
    }
}

impl<T: PageExtractor + ?Sized> PageExtractor for Box<T> {
    fn extract(&self, image: &PageImage, hints: Option<&Hints>) -> Result<PageResult> {
        (**self).extract(image, hints)
    }
}

/// Prompt a vision backend and parse its JSON answer
#[derive(Debug, Clone)]
pub struct VisionExtractor<B> {
    backend: B,
}

impl<B: VisionBackend> VisionExtractor<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: VisionBackend> PageExtractor for VisionExtractor<B> {
    fn extract(&self, image: &PageImage, hints: Option<&Hints>) -> Result<PageResult> {
        let prompt = build_page_prompt(hints);
        let response = self.backend.send_prompt(&prompt, image)?;
        debug!(image = %image, bytes = response.len(), "vision response received");
        parse_page_response(&response)
    }
}

/// Parse a model response into a page result.
///
/// Text that is not JSON fails with `Json`; JSON that does not have the
/// building-model shape (missing field, negative count) fails with
/// `SchemaValidation`.
pub fn parse_page_response(response: &str) -> Result<PageResult> {
    if response.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }
    let json_str = extract_json_from_response(response);
    let value: serde_json::Value = serde_json::from_str(&json_str)?;
    serde_json::from_value(value).map_err(|e| Error::SchemaValidation(e.to_string()))
}

/// Extract JSON from response (handles markdown code blocks)
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}
