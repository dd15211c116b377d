//! The locator-issuing authority.
//!
//! App-private files are never handed out as raw paths. Instead the
//! authority mints `content://<authority>/<root>/<relative path>` locators
//! for files that live under one of its named roots, and maps those locators
//! back to paths when they are opened. A path outside every root cannot get
//! a locator.

use crate::error::LocatorError;
use crate::locator::Locator;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use url::Url;

pub const DEFAULT_AUTHORITY: &str = "dev.picstash.fileprovider";
pub const CACHE_ROOT: &str = "cache";
pub const FILES_ROOT: &str = "files";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Root {
    name: String,
    dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAuthority {
    authority: String,
    roots: Vec<Root>,
}

impl FileAuthority {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            roots: Vec::new(),
        }
    }

    /// Registers a named root. Later registrations of the same name win.
    pub fn with_root(mut self, name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let name = name.into();
        self.roots.retain(|r| r.name != name);
        self.roots.push(Root {
            name,
            dir: dir.into(),
        });
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn root_dir(&self, name: &str) -> Option<&Path> {
        self.roots
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.dir.as_path())
    }

    pub fn locator_for_file(&self, path: &Path) -> Result<Locator, LocatorError> {
        let outside = || LocatorError::OutsideRoots {
            path: path.to_path_buf(),
            authority: self.authority.clone(),
        };

        // Most specific root first, so nested roots resolve to the inner one.
        let mut candidates: Vec<&Root> = self.roots.iter().collect();
        candidates.sort_by_key(|r| std::cmp::Reverse(r.dir.components().count()));

        for root in candidates {
            let Ok(relative) = path.strip_prefix(&root.dir) else {
                continue;
            };

            let mut names = Vec::new();
            for component in relative.components() {
                match component {
                    Component::Normal(name) => names.push(name.to_str().ok_or_else(outside)?),
                    _ => return Err(outside()),
                }
            }
            if names.is_empty() {
                return Err(outside());
            }

            let mut url = Url::parse(&format!("content://{}/", self.authority)).map_err(|e| {
                LocatorError::Parse {
                    input: self.authority.clone(),
                    reason: e.to_string(),
                }
            })?;
            {
                let mut segments = url.path_segments_mut().map_err(|_| LocatorError::Parse {
                    input: self.authority.clone(),
                    reason: "authority cannot carry a path".to_string(),
                })?;
                segments.clear();
                segments.push(&root.name);
                segments.extend(names);
            }
            return Ok(Locator::from(url));
        }

        Err(outside())
    }

    pub fn path_for(&self, locator: &Locator) -> Result<PathBuf, LocatorError> {
        if !locator.is_content() || locator.authority() != Some(self.authority.as_str()) {
            return Err(LocatorError::UnknownAuthority(locator.clone()));
        }

        let invalid = || LocatorError::InvalidSegment(locator.clone());
        let mut segments = locator.as_url().path_segments().ok_or_else(invalid)?;

        let root_name = segments
            .next()
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .ok_or_else(invalid)?;
        let root = self
            .roots
            .iter()
            .find(|r| r.name == root_name)
            .ok_or_else(|| LocatorError::UnknownRoot(locator.clone()))?;

        let mut path = root.dir.clone();
        let mut depth = 0;
        for segment in segments {
            let decoded = percent_decode_str(segment)
                .decode_utf8()
                .map_err(|_| invalid())?;
            if decoded.is_empty()
                || decoded == "."
                || decoded == ".."
                || decoded.contains('/')
                || decoded.contains('\\')
            {
                return Err(invalid());
            }
            path.push(decoded.as_ref());
            depth += 1;
        }

        if depth == 0 {
            return Err(invalid());
        }
        Ok(path)
    }
}
