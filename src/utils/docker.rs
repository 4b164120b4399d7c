//! Container engine verification and build-environment image preparation.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;

use crate::utils::output::print_info;
use crate::utils::tools::ToolError;

/// Boundary to the container runtime.
///
/// The production implementation is [`Docker`]; tests substitute fakes to
/// observe how often verification actually reaches the engine.
#[allow(async_fn_in_trait)]
pub trait ContainerEngine {
    /// Host-scope tool name recorded in the registry.
    fn name(&self) -> &str;

    /// Check that the engine is installed and its daemon is reachable.
    async fn verify(&self) -> Result<(), ToolError>;

    /// Build the image for `tag` from `dockerfile`. Rebuilding an
    /// unchanged Dockerfile reuses cached layers, so this doubles as the
    /// reuse path on repeated invocations.
    async fn build_or_reuse_image(
        &self,
        tag: &str,
        dockerfile: &Path,
        context_dir: &Path,
    ) -> Result<(), ToolError>;
}

/// Docker engine accessed through the `docker` CLI.
pub struct Docker {
    pub tool: String,
}

impl Docker {
    pub fn new() -> Self {
        Self {
            tool: "docker".to_string(),
        }
    }

    /// Use an alternative docker-compatible runtime binary
    #[allow(dead_code)]
    pub fn with_tool(tool: String) -> Self {
        Self { tool }
    }
}

impl Default for Docker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for Docker {
    fn name(&self) -> &str {
        &self.tool
    }

    async fn verify(&self) -> Result<(), ToolError> {
        let status = AsyncCommand::new(&self.tool)
            .arg("info")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|err| ToolError::Unavailable {
                tool: self.tool.clone(),
                reason: err.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Unavailable {
                tool: self.tool.clone(),
                reason: "daemon is not reachable".to_string(),
            })
        }
    }

    async fn build_or_reuse_image(
        &self,
        tag: &str,
        dockerfile: &Path,
        context_dir: &Path,
    ) -> Result<(), ToolError> {
        print_info(&format!("Building build environment image '{tag}'..."));

        let status = AsyncCommand::new(&self.tool)
            .arg("build")
            .arg("--tag")
            .arg(tag)
            .arg("--file")
            .arg(dockerfile)
            .arg(context_dir)
            .status()
            .await
            .map_err(|err| ToolError::ImageBuild {
                tag: tag.to_string(),
                reason: err.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolError::ImageBuild {
                tag: tag.to_string(),
                reason: format!("{} build exited with {status}", self.tool),
            })
        }
    }
}
