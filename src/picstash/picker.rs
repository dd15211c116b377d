use crate::flow::{PickCategory, PickRequest, PickResult, Picker};
use crate::locator::Locator;
use crate::resolver::{mime_for_path, mime_matches, OCTET_STREAM};
use std::path::PathBuf;
use tracing::warn;

/// Picks a file the user already named on the command line.
///
/// Stands in for a document picker: the path is offered once, and is turned
/// into a `file://` locator only if it is an openable file whose content type
/// passes the request's filter. Anything else is reported as a cancelled pick.
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl Picker for PathPicker {
    fn pick(&mut self, request: &PickRequest) -> PickResult {
        let Some(path) = self.path.take() else {
            return PickResult::Cancelled;
        };

        let path = match path.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                warn!(path = %path.display(), "cannot pick: {}", e);
                return PickResult::Cancelled;
            }
        };

        if request.category == PickCategory::Openable && !path.is_file() {
            warn!(path = %path.display(), "cannot pick: not a regular file");
            return PickResult::Cancelled;
        }

        let mime = mime_for_path(&path).unwrap_or(OCTET_STREAM);
        if !mime_matches(&request.mime_filter, mime) {
            warn!(
                path = %path.display(),
                mime,
                filter = %request.mime_filter,
                "cannot pick: content type does not match filter"
            );
            return PickResult::Cancelled;
        }

        PickResult::Picked(Locator::from_file_path(&path).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn request(filter: &str) -> PickRequest {
        PickRequest {
            category: PickCategory::Openable,
            mime_filter: filter.to_string(),
        }
    }

    #[test]
    fn test_picks_matching_image() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cat.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let result = PathPicker::new(Some(path.clone())).pick(&request("image/*"));

        let PickResult::Picked(Some(locator)) = result else {
            panic!("expected a pick, got {:?}", result);
        };
        assert!(locator.is_file());
        assert_eq!(
            locator.as_url().to_file_path().unwrap(),
            path.canonicalize().unwrap()
        );
    }

    #[test]
    fn test_filter_mismatch_cancels() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("notes.txt");
        fs::write(&path, b"text").unwrap();

        let result = PathPicker::new(Some(path)).pick(&request("image/*"));
        assert_eq!(result, PickResult::Cancelled);
    }

    #[test]
    fn test_wildcard_filter_accepts_anything() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob");
        fs::write(&path, b"?").unwrap();

        let result = PathPicker::new(Some(path)).pick(&request("*/*"));
        assert!(matches!(result, PickResult::Picked(Some(_))));
    }

    #[test]
    fn test_missing_or_directory_cancels() {
        let temp = TempDir::new().unwrap();
        let mut picker = PathPicker::new(Some(temp.path().join("nope.png")));
        assert_eq!(picker.pick(&request("image/*")), PickResult::Cancelled);

        let mut picker = PathPicker::new(Some(temp.path().to_path_buf()));
        assert_eq!(picker.pick(&request("*/*")), PickResult::Cancelled);
    }

    #[test]
    fn test_offers_path_only_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cat.png");
        fs::write(&path, b"png").unwrap();

        let mut picker = PathPicker::new(Some(path));
        assert!(matches!(
            picker.pick(&request("image/*")),
            PickResult::Picked(Some(_))
        ));
        assert_eq!(picker.pick(&request("image/*")), PickResult::Cancelled);
    }
}
