use dirs::data_dir;
use once_cell::sync::Lazy;
use std::{fs, io, path::Path, path::PathBuf};

pub const SESSION_FILE: &str = "current_user.json";

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("event-hub")
});

pub fn default_data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_FILE)
}

pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Seed for placeholder images: whitespace runs collapse to a single `-`.
pub fn slug(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join("-")
}
