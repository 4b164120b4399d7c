//! Create command: scaffold each app's project directory and bind its
//! execution context.

use anyhow::{Context, Result};
use std::fs;

use crate::commands::base::BaseCommand;
use crate::commands::{default_data_path, project_base};
use crate::utils::config::{AppDescriptor, Config};
use crate::utils::docker::ContainerEngine;
use crate::utils::output::{print_error, print_info, print_success};

/// Implementation of the 'create' command.
pub struct CreateCommand {
    /// Path to configuration file
    pub config_path: String,
    /// App to create (all apps when not set)
    pub app: Option<String>,
    /// Enable verbose output
    pub verbose: bool,
    /// Run build steps in a container on Linux hosts
    pub use_docker: bool,
}

impl CreateCommand {
    /// Create a new CreateCommand instance
    pub fn new(config_path: String, app: Option<String>, verbose: bool, use_docker: bool) -> Self {
        Self {
            config_path,
            app,
            verbose,
            use_docker,
        }
    }

    /// Execute the create command
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(&self.config_path)
            .with_context(|| format!("Failed to load config from {}", self.config_path))?;
        let apps = config.apps(self.app.as_deref())?;

        let base = BaseCommand::new(
            project_base(&self.config_path),
            default_data_path(),
            self.use_docker,
            &config.python_version(),
        );
        base.verify_tools().await?;

        let mut failed = 0usize;
        for app in &apps {
            print_info(&format!("[{}] Creating app...", app.app_name));
            if self.verbose {
                print_info(&format!(
                    "[{}] Project directory: {}",
                    app.app_name,
                    base.project_path(app).display()
                ));
            }
            if let Err(err) = create_app(&base, app).await {
                print_error(&format!("[{}] {err:#}", app.app_name));
                failed += 1;
                continue;
            }
            print_success(&format!("[{}] Created app.", app.app_name));
        }

        if failed > 0 {
            anyhow::bail!("Failed to create {failed} of {} app(s)", apps.len());
        }
        Ok(())
    }
}

/// Scaffold one app's project directory, then verify and bind its
/// execution context. Per-app failures stay scoped to that app.
pub(crate) async fn create_app<E: ContainerEngine>(
    base: &BaseCommand<E>,
    app: &AppDescriptor,
) -> Result<()> {
    scaffold_app(base, app)?;
    base.verify_app_tools(app).await
}

/// Create the project directory, staging AppDir, and the generated
/// Dockerfile. Existing files are left alone so repeated create calls are
/// safe.
pub(crate) fn scaffold_app<E: ContainerEngine>(
    base: &BaseCommand<E>,
    app: &AppDescriptor,
) -> Result<()> {
    let project_path = base.project_path(app);
    let appdir = project_path.join(format!("{}.AppDir", app.normalized_name()));
    fs::create_dir_all(&appdir)
        .with_context(|| format!("Failed to create project directory {}", appdir.display()))?;

    let dockerfile = project_path.join("Dockerfile");
    if !dockerfile.exists() {
        fs::write(&dockerfile, dockerfile_contents(&base.python_version))
            .with_context(|| format!("Failed to write {}", dockerfile.display()))?;
    }
    Ok(())
}

/// Generated build-environment description for one app.
fn dockerfile_contents(python_version: &str) -> String {
    format!(
        r#"FROM ubuntu:22.04

RUN apt-get update \
    && apt-get install -y --no-install-recommends \
        python{python_version} \
        python{python_version}-dev \
        python{python_version}-venv \
        build-essential \
        file \
    && rm -rf /var/lib/apt/lists/*

WORKDIR /app
"#
    )
}
