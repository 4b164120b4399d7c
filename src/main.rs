use anyhow::Result;
use clap::{Parser, Subcommand};

use satchel::commands::build::BuildCommand;
use satchel::commands::create::CreateCommand;
use satchel::commands::run::RunCommand;

#[derive(Parser)]
#[command(name = "satchel")]
#[command(about = "Satchel - package Python applications as Linux AppImages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold app project directories and build environments
    Create {
        /// Path to satchel.toml configuration file
        #[arg(short, long, default_value = "satchel.toml")]
        config: String,
        /// App to create (defaults to all apps)
        #[arg(long)]
        app: Option<String>,
        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Run build steps directly on the host instead of in a container
        #[arg(long)]
        no_docker: bool,
    },
    /// Build app binaries
    Build {
        /// Path to satchel.toml configuration file
        #[arg(short, long, default_value = "satchel.toml")]
        config: String,
        /// App to build (defaults to all apps)
        #[arg(long)]
        app: Option<String>,
        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Run build steps directly on the host instead of in a container
        #[arg(long)]
        no_docker: bool,
    },
    /// Run a built app
    Run {
        /// Path to satchel.toml configuration file
        #[arg(short, long, default_value = "satchel.toml")]
        config: String,
        /// App to run (required when the project defines several)
        #[arg(long)]
        app: Option<String>,
        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Run build steps directly on the host instead of in a container
        #[arg(long)]
        no_docker: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create {
            config,
            app,
            verbose,
            no_docker,
        } => {
            let create_cmd = CreateCommand::new(config, app, verbose, !no_docker);
            create_cmd.execute().await
        }
        Commands::Build {
            config,
            app,
            verbose,
            no_docker,
        } => {
            let build_cmd = BuildCommand::new(config, app, verbose, !no_docker);
            build_cmd.execute().await
        }
        Commands::Run {
            config,
            app,
            verbose,
            no_docker,
        } => {
            let run_cmd = RunCommand::new(config, app, verbose, !no_docker);
            run_cmd.execute().await
        }
    }
}
