//! Turning locators into byte streams.
//!
//! The [`ContentResolver`] trait is the seam between the copy machinery and
//! wherever bytes actually live. [`LocalResolver`] is the production
//! implementation: it serves `file://` locators directly and `content://`
//! locators through its [`FileAuthority`].

use crate::authority::FileAuthority;
use crate::error::CopyError;
use crate::locator::Locator;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Shared with background copy workers, hence `Send + Sync + 'static`.
pub trait ContentResolver: Send + Sync + 'static {
    fn open_read(&self, locator: &Locator) -> Result<Box<dyn Read + Send>, CopyError>;

    /// Opens the destination for writing, truncating existing content.
    fn open_write(&self, locator: &Locator) -> Result<Box<dyn Write + Send>, CopyError>;

    fn content_type(&self, locator: &Locator) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct LocalResolver {
    authority: FileAuthority,
}

impl LocalResolver {
    pub fn new(authority: FileAuthority) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> &FileAuthority {
        &self.authority
    }

    /// Maps a locator to a filesystem path, or `None` if it is unresolvable.
    pub fn path_for(&self, locator: &Locator) -> Option<PathBuf> {
        if locator.is_file() {
            locator.as_url().to_file_path().ok()
        } else if locator.is_content() {
            self.authority.path_for(locator).ok()
        } else {
            None
        }
    }

    fn resolve(&self, locator: &Locator) -> Result<PathBuf, CopyError> {
        self.path_for(locator)
            .ok_or_else(|| CopyError::Unresolvable(locator.clone()))
    }
}

impl ContentResolver for LocalResolver {
    fn open_read(&self, locator: &Locator) -> Result<Box<dyn Read + Send>, CopyError> {
        let path = self.resolve(locator)?;
        let file = File::open(&path).map_err(|source| CopyError::OpenSource {
            locator: locator.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }

    fn open_write(&self, locator: &Locator) -> Result<Box<dyn Write + Send>, CopyError> {
        let path = self.resolve(locator)?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| CopyError::OpenDestination {
                locator: locator.clone(),
                source,
            })?;
        Ok(Box::new(file))
    }

    fn content_type(&self, locator: &Locator) -> Option<String> {
        let path = self.path_for(locator)?;
        if let Some(mime) = mime_for_path(&path) {
            return Some(mime.to_string());
        }
        path.is_file().then(|| OCTET_STREAM.to_string())
    }
}

/// Content type implied by a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "webp" => "image/webp",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        _ => return None,
    };
    Some(mime)
}

/// Matches a content type against a picker-style filter:
/// `*/*`, `image/*` or an exact `image/png`.
pub fn mime_matches(filter: &str, mime: &str) -> bool {
    let filter = filter.trim().to_ascii_lowercase();
    let mime = mime.trim().to_ascii_lowercase();

    if filter == "*/*" || filter == "*" {
        return true;
    }
    match (filter.split_once('/'), mime.split_once('/')) {
        (Some((ftype, "*")), Some((mtype, _))) => ftype == mtype,
        _ => filter == mime,
    }
}
