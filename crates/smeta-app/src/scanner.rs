//! Page image scanning and validation

use smeta_types::{Error, Result};
use smeta_vision::PageImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported image extensions
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// Check if a path is a supported image file
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Validate a page image exists and has a decodable header
pub fn validate_image(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }

    if !path.is_file() {
        return Err(Error::InvalidImageFormat(format!(
            "{} is not a file",
            path.display()
        )));
    }

    if !is_supported_image(path) {
        return Err(Error::InvalidImageFormat(format!(
            "Unsupported image format: {}",
            path.display()
        )));
    }

    image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()?;

    Ok(())
}

/// Scan a directory for page images, sorted by file name
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(Error::FileNotFound(dir.display().to_string()));
    }

    if !dir.is_dir() {
        return Err(Error::InvalidImageFormat(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();

    images.sort_by(|a, b| {
        a.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .cmp(b.file_name().and_then(|n| n.to_str()).unwrap_or(""))
    });

    Ok(images)
}

/// Turn CLI inputs into an ordered, validated page list.
///
/// Directories expand to their images and every file is validated;
/// URLs pass through unchecked.
pub fn collect_pages(inputs: &[String]) -> Result<Vec<PageImage>> {
    let mut pages = Vec::new();
    for input in inputs {
        match PageImage::parse(input) {
            PageImage::Path(path) if path.is_dir() => {
                for image in scan_directory(&path)? {
                    validate_image(&image)?;
                    pages.push(PageImage::Path(image));
                }
            }
            PageImage::Path(path) => {
                validate_image(&path)?;
                pages.push(PageImage::Path(path));
            }
            url => pages.push(url),
        }
    }
    Ok(pages)
}
