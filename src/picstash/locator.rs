//! Resource locators.
//!
//! A [`Locator`] is an opaque, scheme-based URI naming a byte stream. The
//! crate understands two schemes:
//!
//! - `file:///abs/path` for direct filesystem access
//! - `content://<authority>/<root>/<path>` for app-private files, minted by a
//!   [`FileAuthority`](crate::authority::FileAuthority)
//!
//! Anything else parses fine but will be unresolvable by the built-in
//! resolver.

use crate::error::LocatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use url::Url;

pub const FILE_SCHEME: &str = "file";
pub const CONTENT_SCHEME: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(Url);

impl Locator {
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        Url::parse(input).map(Self).map_err(|e| LocatorError::Parse {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    /// Builds a `file://` locator. The path must be absolute.
    pub fn from_file_path(path: &Path) -> Result<Self, LocatorError> {
        Url::from_file_path(path)
            .map(Self)
            .map_err(|_| LocatorError::Parse {
                input: path.display().to_string(),
                reason: "not an absolute path".to_string(),
            })
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn authority(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn is_file(&self) -> bool {
        self.scheme() == FILE_SCHEME
    }

    pub fn is_content(&self) -> bool {
        self.scheme() == CONTENT_SCHEME
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Last non-empty path segment, still percent-encoded.
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
    }
}

impl From<Url> for Locator {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl FromStr for Locator {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
