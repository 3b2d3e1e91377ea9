//! Input file handling and path utilities.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

pub use negfix_core::decoders::SUPPORTED_EXTENSIONS;

/// Naming rule for generated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    /// Suffix appended to the file stem; inputs containing it are skipped
    pub edit_tag: String,
    /// Folder created next to batch inputs
    pub output_dir_name: String,
}

impl OutputNaming {
    pub fn new(edit_tag: impl Into<String>, output_dir_name: impl Into<String>) -> Self {
        Self {
            edit_tag: edit_tag.into(),
            output_dir_name: output_dir_name.into(),
        }
    }

    /// Whether a file name marks a previously generated output
    pub fn is_edited(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().contains(self.edit_tag.as_str()))
            .unwrap_or(false)
    }

    /// `<stem><edit_tag>.<ext>`, keeping the input's extension
    pub fn file_name(&self, input: &Path) -> Result<String> {
        let stem = input
            .file_stem()
            .with_context(|| format!("Invalid input filename: {}", input.display()))?
            .to_string_lossy();
        Ok(match input.extension() {
            Some(ext) => format!("{}{}.{}", stem, self.edit_tag, ext.to_string_lossy()),
            None => format!("{}{}", stem, self.edit_tag),
        })
    }
}

/// Output path for a single converted file.
///
/// With `out` set the file goes into that directory, otherwise next to the
/// input.
pub fn determine_output_path(
    input: &Path,
    out: Option<&Path>,
    naming: &OutputNaming,
) -> Result<PathBuf> {
    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    Ok(dir.join(naming.file_name(input)?))
}

/// Output path for a batch input: `<parent>/<output_dir_name>/<stem><edit_tag>.<ext>`,
/// or `<out>/<stem><edit_tag>.<ext>` when an output directory is given.
pub fn determine_batch_output_path(
    input: &Path,
    out: Option<&Path>,
    naming: &OutputNaming,
) -> Result<PathBuf> {
    let dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .unwrap_or(Path::new("."))
            .join(&naming.output_dir_name),
    };
    Ok(dir.join(naming.file_name(input)?))
}

/// Expand a list of inputs (files and directories) into a list of image files.
///
/// Directories are scanned for supported image files; files whose name
/// carries the edit tag and the output folder itself are skipped. If
/// `recursive` is true, subdirectories are also scanned.
pub fn expand_inputs(
    inputs: &[PathBuf],
    recursive: bool,
    naming: &OutputNaming,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            collect_images_from_dir(input, recursive, naming, &mut files)?;
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("Path not found: {}", input.display());
        }
    }

    // Sort for consistent ordering
    files.sort();
    files.dedup();
    Ok(files)
}

/// Whether a path has one of the supported image extensions
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively collect image files from a directory.
fn collect_images_from_dir(
    dir: &Path,
    recursive: bool,
    naming: &OutputNaming,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Error reading directory entry")?;
        let path = entry.path();

        if path.is_dir() {
            if recursive && entry.file_name() != naming.output_dir_name.as_str() {
                collect_images_from_dir(&path, recursive, naming, files)?;
            }
        } else if path.is_file() && is_supported_image(&path) {
            if naming.is_edited(&path) {
                tracing::debug!(path = %path.display(), "skipping edited file");
                continue;
            }
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn naming() -> OutputNaming {
        OutputNaming::new("-Edit", "Edits")
    }

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_expand_skips_edited_and_unsupported_files() {
        let dir = TempDir::new().unwrap();
        for name in ["b.tif", "a.JPG", "c.png", "a-Edit.jpg", "notes.txt", "raw.nef"] {
            touch(&dir.path().join(name));
        }

        let files = expand_inputs(&[dir.path().to_path_buf()], false, &naming()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.tif", "c.png"]);
    }

    #[test]
    fn test_recursive_scan_skips_output_folder() {
        let dir = TempDir::new().unwrap();
        let roll = dir.path().join("roll1");
        let edits = dir.path().join("Edits");
        fs::create_dir_all(&roll).unwrap();
        fs::create_dir_all(&edits).unwrap();
        touch(&dir.path().join("top.tiff"));
        touch(&roll.join("frame01.tif"));
        touch(&edits.join("old.tif"));

        let flat = expand_inputs(&[dir.path().to_path_buf()], false, &naming()).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = expand_inputs(&[dir.path().to_path_buf()], true, &naming()).unwrap();
        assert_eq!(deep, vec![roll.join("frame01.tif"), dir.path().join("top.tiff")]);
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(expand_inputs(&[dir.path().join("nope")], false, &naming()).is_err());
    }

    #[test]
    fn test_batch_output_path_uses_edits_folder() {
        let path =
            determine_batch_output_path(Path::new("/scans/frame01.tif"), None, &naming()).unwrap();
        assert_eq!(path, PathBuf::from("/scans/Edits/frame01-Edit.tif"));

        let path = determine_batch_output_path(
            Path::new("/scans/frame01.JPEG"),
            Some(Path::new("/out")),
            &naming(),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/out/frame01-Edit.JPEG"));
    }

    #[test]
    fn test_single_output_path_sits_next_to_input() {
        let path = determine_output_path(Path::new("/scans/neg.png"), None, &naming()).unwrap();
        assert_eq!(path, PathBuf::from("/scans/neg-Edit.png"));
    }

    #[test]
    fn test_custom_edit_tag() {
        let naming = OutputNaming::new("_pos", "Positives");
        assert!(naming.is_edited(Path::new("x_pos.tif")));
        assert!(!naming.is_edited(Path::new("x-Edit.tif")));
        let path = determine_batch_output_path(Path::new("/s/x.tif"), None, &naming).unwrap();
        assert_eq!(path, PathBuf::from("/s/Positives/x_pos.tif"));
    }
}
