//! Build command: produce each app's AppImage through its bound execution
//! context, creating the app first when needed.

use anyhow::{Context, Result};
use std::path::Path;

use crate::commands::base::BaseCommand;
use crate::commands::{create, default_data_path, project_base};
use crate::utils::config::{AppDescriptor, Config};
use crate::utils::docker::ContainerEngine;
use crate::utils::output::{print_error, print_info, print_success};

/// Implementation of the 'build' command.
pub struct BuildCommand {
    /// Path to configuration file
    pub config_path: String,
    /// App to build (all apps when not set)
    pub app: Option<String>,
    /// Enable verbose output
    pub verbose: bool,
    /// Run build steps in a container on Linux hosts
    pub use_docker: bool,
}

impl BuildCommand {
    /// Create a new BuildCommand instance
    pub fn new(config_path: String, app: Option<String>, verbose: bool, use_docker: bool) -> Self {
        Self {
            config_path,
            app,
            verbose,
            use_docker,
        }
    }

    /// Execute the build command
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(&self.config_path)
            .with_context(|| format!("Failed to load config from {}", self.config_path))?;
        let apps = config.apps(self.app.as_deref())?;

        // The build phase derives its command from the create phase's,
        // inheriting configuration and verified tool state.
        let create_base = BaseCommand::new(
            project_base(&self.config_path),
            default_data_path(),
            self.use_docker,
            &config.python_version(),
        );
        create_base.verify_tools().await?;

        let base = create_base.clone_phase();
        base.verify_tools().await?;

        let mut failed = 0usize;
        for app in &apps {
            print_info(&format!("[{}] Building app...", app.app_name));
            if let Err(err) = build_app(&create_base, &base, app, self.verbose).await {
                print_error(&format!("[{}] {err:#}", app.app_name));
                failed += 1;
                continue;
            }
            print_success(&format!("[{}] Built app.", app.app_name));
        }

        if failed > 0 {
            anyhow::bail!("Failed to build {failed} of {} app(s)", apps.len());
        }
        Ok(())
    }
}

/// Build one app: scaffold on demand, verify its tools, and run the
/// bundling step inside the bound execution context.
pub(crate) async fn build_app<E: ContainerEngine>(
    create_base: &BaseCommand<E>,
    base: &BaseCommand<E>,
    app: &AppDescriptor,
    verbose: bool,
) -> Result<()> {
    let project_path = base.project_path(app);
    if !project_path.join("Dockerfile").exists() {
        print_info(&format!(
            "[{}] App has not been created; creating it first.",
            app.app_name
        ));
        create::create_app(create_base, app).await?;
    }

    base.verify_app_tools(app).await?;

    let binary = base.binary_path(app)?;
    let command = bundle_command(app, &binary)?;
    let ok = base
        .run_in_context(app, &command, &project_path, verbose)
        .await?;
    if !ok {
        anyhow::bail!("Bundling step failed for app '{}'", app.app_name);
    }
    Ok(())
}

/// The bundling invocation, run with the app's project directory as the
/// working directory. The output path is relative so it resolves in both
/// execution contexts.
fn bundle_command(app: &AppDescriptor, binary: &Path) -> Result<Vec<String>> {
    let file_name = binary
        .file_name()
        .and_then(|name| name.to_str())
        .context("Binary path has no file name")?;

    Ok(vec![
        "appimagetool".to_string(),
        format!("{}.AppDir", app.normalized_name()),
        format!("../../{file_name}"),
    ])
}
