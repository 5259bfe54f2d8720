//! VisionBackend that shells out to an external model CLI
//!
//! The command line is a template split with shell-words. Placeholders:
//! - `{image}`: page path or URL
//! - `{image_data_url}`: base64 `data:` URL of a local page (URLs pass through)
//!
//! The prompt is written to the child's stdin; stdout is the response.

use base64::{engine::general_purpose::STANDARD, Engine};
use smeta_types::{Error, Result};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use super::backend::{PageImage, VisionBackend};

const IMAGE_PLACEHOLDER: &str = "{image}";
const DATA_URL_PLACEHOLDER: &str = "{image_data_url}";

#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse a command template such as `llm -m gpt-4o -a {image}`
    pub fn new(template: &str) -> Result<Self> {
        let mut parts = shell_words::split(template)
            .map_err(|e| Error::Backend(format!("Invalid vision command `{}`: {}", template, e)))?;
        if parts.is_empty() {
            return Err(Error::Backend("Vision command is empty".to_string()));
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, image: &PageImage) -> Result<Vec<String>> {
        let image_ref = image.to_string();
        let needs_data_url = self.args.iter().any(|a| a.contains(DATA_URL_PLACEHOLDER));
        let data_url = if needs_data_url {
            Some(image_data_url(image)?)
        } else {
            None
        };

        Ok(self
            .args
            .iter()
            .map(|arg| {
                let mut arg = arg.replace(IMAGE_PLACEHOLDER, &image_ref);
                if let Some(ref url) = data_url {
                    arg = arg.replace(DATA_URL_PLACEHOLDER, url);
                }
                arg
            })
            .collect())
    }
}

impl VisionBackend for CommandBackend {
    fn send_prompt(&self, prompt: &str, image: &PageImage) -> Result<String> {
        let args = self.render_args(image)?;
        debug!(program = %self.program, image = %image, "running vision command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Backend(format!("Failed to start `{}`: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // a command that ignores stdin may close it early
            match stdin.write_all(prompt.as_bytes()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Backend(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Inline a local page as a base64 data URL
pub fn image_data_url(image: &PageImage) -> Result<String> {
    match image {
        PageImage::Url(url) => Ok(url.clone()),
        PageImage::Path(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound(path.display().to_string()));
            }
            let bytes = std::fs::read(path)?;
            Ok(format!("data:{};base64,{}", mime_type(path), STANDARD.encode(bytes)))
        }
    }
}

fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new_rejects_empty_template() {
        assert!(CommandBackend::new("   ").is_err());
        assert!(CommandBackend::new("llm \"unterminated").is_err());
    }

    #[test]
    fn test_render_image_placeholder() {
        let backend = CommandBackend::new("llm -m gpt-4o -a {image}").unwrap();
        assert_eq!(backend.program(), "llm");
        let args = backend
            .render_args(&PageImage::Url("https://x.test/p1.png".to_string()))
            .unwrap();
        assert_eq!(args, vec!["-m", "gpt-4o", "-a", "https://x.test/p1.png"]);
    }

    #[test]
    fn test_data_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.jpg");
        std::fs::write(&path, b"abc").unwrap();
        let url = image_data_url(&PageImage::Path(path)).unwrap();
        assert_eq!(url, "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_data_url_missing_file() {
        let err = image_data_url(&PageImage::Path(PathBuf::from("/no/such/page.png"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_prompt_goes_to_stdin() {
        let backend = CommandBackend::new("cat").unwrap();
        let out = backend
            .send_prompt("hello plan", &PageImage::Path(PathBuf::from("p.png")))
            .unwrap();
        assert_eq!(out, "hello plan");
    }

    #[cfg(unix)]
    #[test]
    fn test_image_argument_substituted() {
        let backend = CommandBackend::new("echo {image}").unwrap();
        let out = backend
            .send_prompt("ignored", &PageImage::Path(PathBuf::from("plans/p1.png")))
            .unwrap();
        assert_eq!(out.trim(), "plans/p1.png");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_backend_error() {
        let backend = CommandBackend::new("sh -c 'echo boom >&2; exit 3'").unwrap();
        let err = backend
            .send_prompt("x", &PageImage::Url("https://x.test/p.png".to_string()))
            .unwrap_err();
        match err {
            Error::Backend(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
