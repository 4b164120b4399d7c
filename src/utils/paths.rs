//! Build artifact path resolution for AppImage outputs.
//!
//! Pure functions of (app, base directory, architecture); nothing here
//! touches the filesystem.

use std::path::{Path, PathBuf};

use crate::utils::config::AppDescriptor;

/// Platform directory under the project base.
pub const PLATFORM: &str = "linux";
/// Output-format directory under the platform directory.
pub const OUTPUT_FORMAT: &str = "appimage";

const BINARY_EXT: &str = "AppImage";

/// Path resolution error type
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Host architecture '{0}' is not supported for AppImage builds")]
    UnsupportedArch(String),
}

/// Map a host architecture string to the AppImage architecture suffix.
///
/// Unrecognized architectures are a fatal configuration error; there is no
/// fallback value.
pub fn appimage_arch(host_arch: &str) -> Result<&'static str, PathError> {
    match host_arch {
        "x86_64" => Ok("x86_64"),
        "aarch64" => Ok("aarch64"),
        "i686" => Ok("i686"),
        other => Err(PathError::UnsupportedArch(other.to_string())),
    }
}

/// The platform directory shared by every app in the project.
pub fn platform_path(base: &Path) -> PathBuf {
    base.join(PLATFORM)
}

/// Per-app project directory; the display name keeps its spaces.
pub fn project_path(base: &Path, app: &AppDescriptor) -> PathBuf {
    base.join(PLATFORM).join(OUTPUT_FORMAT).join(&app.formal_name)
}

/// Location of the built binary for one app and architecture.
pub fn binary_path(
    base: &Path,
    app: &AppDescriptor,
    host_arch: &str,
) -> Result<PathBuf, PathError> {
    let arch = appimage_arch(host_arch)?;
    Ok(base.join(PLATFORM).join(format!(
        "{}-{}-{}.{}",
        app.normalized_name(),
        app.version,
        arch,
        BINARY_EXT
    )))
}

/// Location of the distributable artifact. AppImage is a single-file
/// format, so this is the binary itself.
pub fn distribution_path(
    base: &Path,
    app: &AppDescriptor,
    host_arch: &str,
) -> Result<PathBuf, PathError> {
    binary_path(base, app, host_arch)
}
