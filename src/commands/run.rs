//! Run command: execute a built app on the host, building it first when
//! the binary is missing.

use anyhow::{Context, Result};
use tokio::process::Command as AsyncCommand;

use crate::commands::base::BaseCommand;
use crate::commands::{build, default_data_path, project_base};
use crate::utils::config::Config;
use crate::utils::output::print_info;

/// Implementation of the 'run' command.
pub struct RunCommand {
    /// Path to configuration file
    pub config_path: String,
    /// App to run (required when the project defines several)
    pub app: Option<String>,
    /// Enable verbose output
    pub verbose: bool,
    /// Run build steps in a container on Linux hosts
    pub use_docker: bool,
}

impl RunCommand {
    /// Create a new RunCommand instance
    pub fn new(config_path: String, app: Option<String>, verbose: bool, use_docker: bool) -> Self {
        Self {
            config_path,
            app,
            verbose,
            use_docker,
        }
    }

    /// Execute the run command
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(&self.config_path)
            .with_context(|| format!("Failed to load config from {}", self.config_path))?;
        let app = config.one_app(self.app.as_deref())?;

        let base = BaseCommand::new(
            project_base(&self.config_path),
            default_data_path(),
            self.use_docker,
            &config.python_version(),
        );
        base.verify_tools().await?;

        let binary = base.binary_path(&app)?;
        if !binary.exists() {
            print_info(&format!(
                "[{}] Binary not found; building it first.",
                app.app_name
            ));
            // Earlier phases derive their commands from this one, sharing
            // its verified tool state.
            let build_base = base.clone_phase();
            build_base.verify_tools().await?;
            let create_base = base.clone_phase();
            build::build_app(&create_base, &build_base, &app, self.verbose).await?;
        }

        print_info(&format!("Starting app '{}'...", app.formal_name));
        // The packaged binary always runs on the host, whichever context
        // built it.
        let status = AsyncCommand::new(&binary)
            .status()
            .await
            .with_context(|| format!("Failed to start {}", binary.display()))?;

        if !status.success() {
            anyhow::bail!("App '{}' exited with {status}", app.app_name);
        }
        Ok(())
    }
}
