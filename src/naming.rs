//! File naming for cropped derivatives.
//!
//! A cropped size is written next to the original upload, with the target
//! dimensions appended to the file stem:
//!
//! - `2024/05/beach.jpg` at 300×200 → `2024/05/beach-300x200.jpg`
//! - `portrait.final.png` at 150×150 → `portrait.final-150x150.png`
//! - `scan` at 64×64 → `scan-64x64`
//!
//! Only the file name changes; directory components are kept as-is so the
//! derivative lands beside its source.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Build the derivative path for `attached` at `width`×`height`.
///
/// Returns `None` when the path has no usable file stem (empty, `..`, or a
/// bare directory), since there is nothing to attach the suffix to. Stems
/// and extensions are kept byte-for-byte, so non-UTF-8 names work too.
pub fn derived_file_name(attached: &Path, width: u32, height: u32) -> Option<PathBuf> {
    let stem = attached.file_stem()?;
    if stem.is_empty() {
        return None;
    }

    let mut name = OsString::from(stem);
    name.push(format!("-{width}x{height}"));
    if let Some(ext) = attached.extension() {
        name.push(".");
        name.push(ext);
    }

    Some(attached.with_file_name(name))
}

/// Resolve the derivative path under the upload root.
///
/// `attached` is the upload-relative path the host stored for the image.
pub fn derived_path(
    upload_dir: &Path,
    attached: &Path,
    width: u32,
    height: u32,
) -> Option<PathBuf> {
    derived_file_name(attached, width, height).map(|name| upload_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_upload_path() {
        assert_eq!(
            derived_file_name(Path::new("2024/05/beach.jpg"), 300, 200),
            Some(PathBuf::from("2024/05/beach-300x200.jpg"))
        );
    }

    #[test]
    fn only_last_extension_is_kept_after_suffix() {
        assert_eq!(
            derived_file_name(Path::new("portrait.final.png"), 150, 150),
            Some(PathBuf::from("portrait.final-150x150.png"))
        );
    }

    #[test]
    fn stem_is_replaced_only_in_file_name() {
        // The directory shares the stem; only the file name gets the suffix.
        assert_eq!(
            derived_file_name(Path::new("beach/beach.jpg"), 10, 20),
            Some(PathBuf::from("beach/beach-10x20.jpg"))
        );
    }

    #[test]
    fn no_extension() {
        assert_eq!(
            derived_file_name(Path::new("scan"), 64, 64),
            Some(PathBuf::from("scan-64x64"))
        );
    }

    #[test]
    fn empty_path_has_no_derivative() {
        assert_eq!(derived_file_name(Path::new(""), 64, 64), None);
        assert_eq!(derived_file_name(Path::new(".."), 64, 64), None);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_stem_is_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let attached = Path::new(OsStr::from_bytes(b"up/caf\xe9.jpg"));
        assert_eq!(
            derived_file_name(attached, 300, 200),
            Some(PathBuf::from(OsStr::from_bytes(b"up/caf\xe9-300x200.jpg")))
        );
    }

    #[test]
    fn joined_under_upload_dir() {
        assert_eq!(
            derived_path(Path::new("/srv/uploads"), Path::new("2024/05/beach.jpg"), 300, 200),
            Some(PathBuf::from("/srv/uploads/2024/05/beach-300x200.jpg"))
        );
    }
}
