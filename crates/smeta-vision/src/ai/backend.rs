//! Vision backend seam

use smeta_types::Result;
use std::fmt;
use std::path::PathBuf;

/// A floor-plan page handed to a vision model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageImage {
    Path(PathBuf),
    Url(String),
}

impl PageImage {
    /// `http(s)://` and `data:` inputs become URLs, anything else a path
    pub fn parse(input: &str) -> Self {
        let lower = input.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
            PageImage::Url(input.to_string())
        } else {
            PageImage::Path(PathBuf::from(input))
        }
    }
}

impl fmt::Display for PageImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageImage::Path(path) => write!(f, "{}", path.display()),
            PageImage::Url(url) => f.write_str(url),
        }
    }
}

/// Sends one prompt plus one page image to a model and returns its raw text
pub trait VisionBackend {
    fn send_prompt(&self, prompt: &str, image: &PageImage) -> Result<String>;
}

impl<T: VisionBackend + ?Sized> VisionBackend for &T {
    fn send_prompt(&self, prompt: &str, image: &PageImage) -> Result<String> {
        (**self).send_prompt(prompt, image)
    }
}

impl<T: VisionBackend + ?Sized> VisionBackend for Box<T> {
    fn send_prompt(&self, prompt: &str, image: &PageImage) -> Result<String> {
        (**self).send_prompt(prompt, image)
    }
}
