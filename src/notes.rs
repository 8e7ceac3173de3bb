use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Fixed memo file name, one per folder.
pub const NOTE_FILE_NAME: &str = "folder_memo.txt";

pub fn note_path(folder: &Path) -> PathBuf {
    folder.join(NOTE_FILE_NAME)
}

/// Read the memo for `folder`. A missing file is an empty memo, not an error.
pub fn load(folder: &Path) -> anyhow::Result<String> {
    let path = note_path(folder);
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
}

/// Overwrite the memo for `folder`. UTF-8 on disk.
pub fn save(folder: &Path, text: &str) -> anyhow::Result<()> {
    let path = note_path(folder);
    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
}

pub fn create_empty(folder: &Path) -> anyhow::Result<()> {
    let path = note_path(folder);
    fs::File::create(&path)
        .with_context(|| format!("creating {}", path.display()))
        .map(|_| ())
}
