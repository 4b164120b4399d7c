//! Execution contexts: where build steps for an app actually run.
//!
//! Both variants expose the same capability (run a command list with a
//! working directory), so phase code is agnostic to which one it holds.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;

use crate::utils::output::print_info;

/// Container-side mount point for the project base directory.
pub const APP_MOUNT: &str = "/app";
/// Container-side mount point for the platform directory.
pub const PLATFORM_MOUNT: &str = "/platform";
/// Container-side mount point for the host data/cache directory.
pub const DATA_MOUNT: &str = "/satchel";

/// Where commands for one app execute: directly on the host, or inside
/// the app's pre-built build-environment container.
#[derive(Debug, Clone)]
pub enum ExecutionContext {
    Local(LocalContext),
    Container(ContainerContext),
}

impl ExecutionContext {
    /// Run a command list with the given working directory, returning
    /// whether it exited successfully.
    pub async fn run(&self, command: &[String], cwd: &Path, verbose: bool) -> Result<bool> {
        match self {
            Self::Local(local) => local.run(command, cwd, verbose).await,
            Self::Container(container) => container.run(command, cwd, verbose).await,
        }
    }
}

/// Runs commands directly on the host.
#[derive(Debug, Clone, Default)]
pub struct LocalContext;

impl LocalContext {
    pub fn new() -> Self {
        Self
    }

    async fn run(&self, command: &[String], cwd: &Path, verbose: bool) -> Result<bool> {
        let (program, args) = command.split_first().context("Empty command")?;

        if verbose {
            print_info(&format!("Running: {}", command.join(" ")));
        }

        let status = AsyncCommand::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .await
            .with_context(|| format!("Failed to execute '{program}'"))?;

        Ok(status.success())
    }
}

/// Runs commands inside the app's build container, with the project
/// directories bind-mounted in.
#[derive(Debug, Clone)]
pub struct ContainerContext {
    /// Container runtime binary ("docker")
    pub tool: String,
    pub image_tag: String,
    pub dockerfile_path: PathBuf,
    pub app_base_path: PathBuf,
    pub host_platform_path: PathBuf,
    pub host_data_path: PathBuf,
}

impl ContainerContext {
    /// Translate a host path under one of the mounted roots into its
    /// container-side location.
    ///
    /// The platform directory nests under the base directory on the host,
    /// so it is matched first.
    pub fn container_path(&self, host: &Path) -> Option<PathBuf> {
        if let Ok(rel) = host.strip_prefix(&self.host_platform_path) {
            return Some(mount_join(PLATFORM_MOUNT, rel));
        }
        if let Ok(rel) = host.strip_prefix(&self.app_base_path) {
            return Some(mount_join(APP_MOUNT, rel));
        }
        if let Ok(rel) = host.strip_prefix(&self.host_data_path) {
            return Some(mount_join(DATA_MOUNT, rel));
        }
        None
    }

    /// Assemble the full `docker run` argv for one command.
    pub fn container_run_command(&self, command: &[String], cwd: &Path) -> Vec<String> {
        let mut argv = vec![self.tool.clone(), "run".to_string(), "--rm".to_string()];

        for (host, mount) in [
            (&self.app_base_path, APP_MOUNT),
            (&self.host_platform_path, PLATFORM_MOUNT),
            (&self.host_data_path, DATA_MOUNT),
        ] {
            argv.push("--volume".to_string());
            argv.push(format!("{}:{mount}:rw", host.display()));
        }

        let workdir = self
            .container_path(cwd)
            .unwrap_or_else(|| PathBuf::from(APP_MOUNT));
        argv.push("--workdir".to_string());
        argv.push(workdir.display().to_string());

        argv.push(self.image_tag.clone());
        argv.extend(command.iter().cloned());
        argv
    }

    async fn run(&self, command: &[String], cwd: &Path, verbose: bool) -> Result<bool> {
        let argv = self.container_run_command(command, cwd);

        if verbose {
            print_info(&format!("Container command: {}", argv.join(" ")));
        }

        let (program, args) = argv.split_first().context("Empty container command")?;
        let status = AsyncCommand::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to execute '{program}'"))?;

        Ok(status.success())
    }
}

// `Path::join("")` leaves a trailing separator; mount roots map to
// themselves instead.
fn mount_join(mount: &str, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        PathBuf::from(mount)
    } else {
        Path::new(mount).join(rel)
    }
}
