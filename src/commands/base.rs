//! Shared command core for build phases: tool verification and
//! execution-context selection, reused by `create`, `build`, and `run`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::utils::config::AppDescriptor;
use crate::utils::context::{ContainerContext, ExecutionContext, LocalContext};
use crate::utils::docker::{ContainerEngine, Docker};
use crate::utils::paths::{self, PathError};
use crate::utils::tools::{ToolError, ToolRegistry};

/// Namespace prefix for generated build-environment image tags.
pub const IMAGE_NAMESPACE: &str = "satchel";

/// Per-phase command state.
///
/// Paths and host identifiers are fixed at construction; container mounts
/// pass them through unmodified. A later phase derives its command with
/// [`BaseCommand::clone_phase`], sharing the registry so verification work
/// is never repeated within one CLI invocation.
pub struct BaseCommand<E: ContainerEngine = Docker> {
    /// Project base directory
    pub base_path: PathBuf,
    /// Platform directory under the base, fixed at construction
    pub platform_path: PathBuf,
    /// Host data/cache directory
    pub data_path: PathBuf,
    /// Host operating system identifier ("linux", "macos", ...)
    pub host_os: String,
    /// Host architecture string ("x86_64", ...)
    pub host_arch: String,
    /// Python minor version packaged into build environments ("3.12")
    pub python_version: String,
    /// Whether build steps run inside a container on a Linux host
    pub use_docker: bool,
    /// Whether this command was derived from an earlier phase
    pub is_clone: bool,
    registry: Arc<Mutex<ToolRegistry>>,
    engine: Arc<E>,
}

impl BaseCommand<Docker> {
    /// Create a phase command for the current host, backed by Docker.
    pub fn new(
        base_path: PathBuf,
        data_path: PathBuf,
        use_docker: bool,
        python_version: &str,
    ) -> Self {
        Self::with_engine(
            base_path,
            data_path,
            use_docker,
            std::env::consts::OS,
            std::env::consts::ARCH,
            python_version,
            Docker::new(),
        )
    }
}

impl<E: ContainerEngine> BaseCommand<E> {
    /// Create a phase command with an explicit host and container engine.
    pub fn with_engine(
        base_path: PathBuf,
        data_path: PathBuf,
        use_docker: bool,
        host_os: &str,
        host_arch: &str,
        python_version: &str,
        engine: E,
    ) -> Self {
        let platform_path = paths::platform_path(&base_path);
        Self {
            base_path,
            platform_path,
            data_path,
            host_os: host_os.to_string(),
            host_arch: host_arch.to_string(),
            python_version: python_version.to_string(),
            use_docker,
            is_clone: false,
            registry: Arc::new(Mutex::new(ToolRegistry::new())),
            engine: Arc::new(engine),
        }
    }

    /// Derive a later phase's command from this one: scalar configuration
    /// is copied, the registry (and engine) are shared by reference.
    pub fn clone_phase(&self) -> Self {
        Self {
            base_path: self.base_path.clone(),
            platform_path: self.platform_path.clone(),
            data_path: self.data_path.clone(),
            host_os: self.host_os.clone(),
            host_arch: self.host_arch.clone(),
            python_version: self.python_version.clone(),
            use_docker: self.use_docker,
            is_clone: true,
            registry: Arc::clone(&self.registry),
            engine: Arc::clone(&self.engine),
        }
    }

    /// Shared registry handle.
    pub fn registry(&self) -> &Arc<Mutex<ToolRegistry>> {
        &self.registry
    }

    fn lock_registry(&self) -> MutexGuard<'_, ToolRegistry> {
        // Single-writer discipline; recover rather than propagate poison.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether this host/flag combination ever takes the container path.
    fn docker_required(&self) -> bool {
        self.use_docker || self.host_os != "linux"
    }

    /// Verify host-scope prerequisites. Idempotent: once the registry's
    /// completion flag is set, no external verification runs again.
    pub async fn verify_tools(&self) -> Result<()> {
        if self.lock_registry().host_verified() {
            return Ok(());
        }

        if self.docker_required() {
            self.verify_engine().await?;
        }

        self.lock_registry().mark_host_verified();
        Ok(())
    }

    async fn verify_engine(&self) -> Result<(), ToolError> {
        if self.lock_registry().has_tool(self.engine.name()) {
            return Ok(());
        }
        self.engine.verify().await?;
        self.lock_registry().record_tool(self.engine.name());
        Ok(())
    }

    /// Select and bind the execution context for one app.
    ///
    /// Requires [`BaseCommand::verify_tools`] to have completed. Idempotent
    /// per app; a bound context is never replaced. An image-build failure
    /// is fatal for this app only and leaves other bindings usable.
    pub async fn verify_app_tools(&self, app: &AppDescriptor) -> Result<()> {
        {
            let registry = self.lock_registry();
            if !registry.host_verified() {
                return Err(ToolError::VerificationOrder.into());
            }
            if registry.context(&app.app_name).is_some() {
                return Ok(());
            }
        }

        if self.host_os == "linux" && !self.use_docker {
            self.lock_registry()
                .bind_context(&app.app_name, ExecutionContext::Local(LocalContext::new()));
            return Ok(());
        }

        self.verify_engine().await?;

        let image_tag = self.docker_image_tag(app);
        let project_path = self.project_path(app);
        let dockerfile_path = project_path.join("Dockerfile");
        self.engine
            .build_or_reuse_image(&image_tag, &dockerfile_path, &project_path)
            .await
            .with_context(|| {
                format!("Failed to prepare build environment for app '{}'", app.app_name)
            })?;

        let context = ContainerContext {
            tool: self.engine.name().to_string(),
            image_tag,
            dockerfile_path,
            app_base_path: self.base_path.clone(),
            host_platform_path: self.platform_path.clone(),
            host_data_path: self.data_path.clone(),
        };
        self.lock_registry()
            .bind_context(&app.app_name, ExecutionContext::Container(context));
        Ok(())
    }

    /// Tag for an app's build-environment image. Case-insensitive with
    /// respect to the bundle identifier and pinned to the target Python
    /// minor version.
    pub fn docker_image_tag(&self, app: &AppDescriptor) -> String {
        format!(
            "{IMAGE_NAMESPACE}/{}:py{}",
            app.bundle_identifier().to_lowercase(),
            self.python_version
        )
    }

    pub fn project_path(&self, app: &AppDescriptor) -> PathBuf {
        paths::project_path(&self.base_path, app)
    }

    pub fn binary_path(&self, app: &AppDescriptor) -> Result<PathBuf, PathError> {
        paths::binary_path(&self.base_path, app, &self.host_arch)
    }

    pub fn distribution_path(&self, app: &AppDescriptor) -> Result<PathBuf, PathError> {
        paths::distribution_path(&self.base_path, app, &self.host_arch)
    }

    /// The execution context bound for an app by a prior
    /// [`BaseCommand::verify_app_tools`] call.
    pub fn app_context(&self, app: &AppDescriptor) -> Result<ExecutionContext> {
        self.lock_registry()
            .context(&app.app_name)
            .cloned()
            .ok_or_else(|| {
                anyhow::anyhow!("No execution context bound for app '{}'", app.app_name)
            })
    }

    /// Run a command through the app's bound execution context.
    pub async fn run_in_context(
        &self,
        app: &AppDescriptor,
        command: &[String],
        cwd: &std::path::Path,
        verbose: bool,
    ) -> Result<bool> {
        self.app_context(app)?.run(command, cwd, verbose).await
    }
}
