use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One mailbox folder discovered in the export tree
#[derive(Debug, Clone)]
pub struct MboxFolder {
    /// Display label, derived from the relative path with `.mbox` stripped
    pub label: String,
    /// Path to the folder's `mbox` payload file
    pub mbox_path: PathBuf,
}

/// Find every `*.mbox` directory under `root` that carries an `mbox` file.
///
/// Results are sorted by label. Ingestion order feeds the first-writer-wins
/// parent rule downstream, so enumeration must not depend on whatever order
/// the filesystem happens to return entries in.
pub fn discover_folders(root: &Path) -> Vec<MboxFolder> {
    let mut folders: Vec<MboxFolder> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_dir()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(".mbox"))
        })
        .filter_map(|entry| {
            let mbox_path = entry.path().join("mbox");
            if !mbox_path.is_file() {
                return None;
            }
            Some(MboxFolder {
                label: folder_label(root, entry.path()),
                mbox_path,
            })
        })
        .collect();

    folders.sort_by(|a, b| a.label.cmp(&b.label));
    folders
}

/// "Parent.mbox/Child.mbox" under root becomes "Parent/Child"
fn folder_label(root: &Path, dir: &Path) -> String {
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let mut label = String::new();
    for component in rel.components() {
        let part = component.as_os_str().to_string_lossy();
        if !label.is_empty() {
            label.push('/');
        }
        label.push_str(part.strip_suffix(".mbox").unwrap_or(&part));
    }
    label
}
