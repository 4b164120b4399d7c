pub mod base;
pub mod build;
pub mod create;
pub mod run;

use std::path::{Path, PathBuf};

/// Project base directory: the directory holding the configuration file.
pub(crate) fn project_base(config_path: &str) -> PathBuf {
    Path::new(config_path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default host data/cache directory for downloaded tools and caches.
pub(crate) fn default_data_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "satchel")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".satchel"))
}
