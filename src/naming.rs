//! Output naming: target folders and wallpaper file paths.
//!
//! Target names and image names are used verbatim as path segments:
//!
//! ```text
//! resized/
//! ├── iPhone 8, 7, 6, 6s/
//! │   ├── Spicy_Dark.png
//! │   └── Spicy_Dark_solo.png
//! └── HD Landscape/
//!     └── ...
//! ```
//!
//! Nothing is sanitized. A name that cannot stand as a single segment is
//! rejected up front by [`check_segment`] instead of being rewritten.

use std::path::{Path, PathBuf};

/// Why a name cannot be used as one path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentProblem {
    Empty,
    DotSegment,
    Separator(char),
}

impl std::fmt::Display for SegmentProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "is empty"),
            Self::DotSegment => write!(f, "is a relative path segment"),
            Self::Separator('\0') => write!(f, "contains a NUL byte"),
            Self::Separator(c) => write!(f, "contains path separator {c:?}"),
        }
    }
}

/// Check that `name` stays exactly one directory level below its parent.
///
/// Other characters (spaces, commas, colons) pass through untouched; whether
/// the filesystem accepts them is left to the write, which fails per pair.
pub fn check_segment(name: &str) -> Result<(), SegmentProblem> {
    if name.is_empty() {
        return Err(SegmentProblem::Empty);
    }
    if name == "." || name == ".." {
        return Err(SegmentProblem::DotSegment);
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(SegmentProblem::Separator(c));
    }
    Ok(())
}

/// Folder that holds every wallpaper for one target.
pub fn target_dir(output_root: &Path, target_name: &str) -> PathBuf {
    output_root.join(target_name)
}

/// `<output_root>/<target_name>/<image_name>.<extension>`
pub fn output_path(
    output_root: &Path,
    target_name: &str,
    image_name: &str,
    extension: &str,
) -> PathBuf {
    target_dir(output_root, target_name).join(format!("{image_name}.{extension}"))
}

/// `<input_dir>/<image_name>.<extension>`
pub fn source_path(input_dir: &Path, image_name: &str, extension: &str) -> PathBuf {
    input_dir.join(format!("{image_name}.{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_with_spaces_and_commas_is_fine() {
        assert_eq!(check_segment("iPhone 8 Plus, 7 Plus, 6 Plus, 6s Plus"), Ok(()));
    }

    #[test]
    fn segment_with_colon_is_passed_through() {
        assert_eq!(check_segment("QHD 21:9 Ultrawide Landscape"), Ok(()));
    }

    #[test]
    fn segment_empty_rejected() {
        assert_eq!(check_segment(""), Err(SegmentProblem::Empty));
    }

    #[test]
    fn segment_dots_rejected() {
        assert_eq!(check_segment("."), Err(SegmentProblem::DotSegment));
        assert_eq!(check_segment(".."), Err(SegmentProblem::DotSegment));
        assert_eq!(check_segment("...hidden"), Ok(()));
    }

    #[test]
    fn segment_separators_rejected() {
        assert_eq!(check_segment("a/b"), Err(SegmentProblem::Separator('/')));
        assert_eq!(check_segment("a\\b"), Err(SegmentProblem::Separator('\\')));
        assert_eq!(check_segment("a\0b"), Err(SegmentProblem::Separator('\0')));
    }

    #[test]
    fn problem_messages() {
        assert_eq!(SegmentProblem::Empty.to_string(), "is empty");
        assert_eq!(
            SegmentProblem::Separator('/').to_string(),
            "contains path separator '/'"
        );
    }

    #[test]
    fn output_path_uses_names_verbatim() {
        let path = output_path(Path::new("resized"), "iPhone 8, 7, 6, 6s", "Spicy_Dark", "png");
        assert_eq!(
            path,
            Path::new("resized").join("iPhone 8, 7, 6, 6s").join("Spicy_Dark.png")
        );
    }

    #[test]
    fn source_path_appends_extension() {
        assert_eq!(
            source_path(Path::new("."), "Spicy_Dark_solo", "png"),
            Path::new(".").join("Spicy_Dark_solo.png")
        );
    }
}
