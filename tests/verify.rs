//! Tool-verification and context-selection integration tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use satchel::commands::base::BaseCommand;
use satchel::utils::config::AppDescriptor;
use satchel::utils::context::ExecutionContext;
use satchel::utils::docker::ContainerEngine;
use satchel::utils::tools::ToolError;

/// Observable engine state, shared with the test after the engine moves
/// into the command.
#[derive(Default)]
struct EngineState {
    verify_calls: AtomicUsize,
    builds: Mutex<Vec<(String, PathBuf)>>,
    fail_tag_containing: Mutex<Option<String>>,
}

impl EngineState {
    fn verify_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    fn builds(&self) -> Vec<(String, PathBuf)> {
        self.builds.lock().unwrap().clone()
    }

    fn fail_builds_containing(&self, fragment: &str) {
        *self.fail_tag_containing.lock().unwrap() = Some(fragment.to_string());
    }
}

/// Fake container engine that records every call it receives.
#[derive(Clone, Default)]
struct RecordingEngine {
    state: Arc<EngineState>,
}

impl ContainerEngine for RecordingEngine {
    fn name(&self) -> &str {
        "docker"
    }

    async fn verify(&self) -> Result<(), ToolError> {
        self.state.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn build_or_reuse_image(
        &self,
        tag: &str,
        dockerfile: &Path,
        _context_dir: &Path,
    ) -> Result<(), ToolError> {
        if let Some(fragment) = self.state.fail_tag_containing.lock().unwrap().as_deref() {
            if tag.contains(fragment) {
                return Err(ToolError::ImageBuild {
                    tag: tag.to_string(),
                    reason: "simulated build failure".to_string(),
                });
            }
        }
        self.state
            .builds
            .lock()
            .unwrap()
            .push((tag.to_string(), dockerfile.to_path_buf()));
        Ok(())
    }
}

fn command(use_docker: bool, host_os: &str) -> (BaseCommand<RecordingEngine>, Arc<EngineState>) {
    let engine = RecordingEngine::default();
    let state = Arc::clone(&engine.state);
    let base = BaseCommand::with_engine(
        PathBuf::from("/projects/base_path"),
        PathBuf::from("/projects/satchel-data"),
        use_docker,
        host_os,
        "x86_64",
        "3.12",
        engine,
    );
    (base, state)
}

fn app(app_name: &str, formal_name: &str) -> AppDescriptor {
    AppDescriptor {
        app_name: app_name.to_string(),
        formal_name: formal_name.to_string(),
        bundle: "com.example".to_string(),
        version: "0.0.1".to_string(),
    }
}

#[tokio::test]
async fn linux_without_docker_binds_local() {
    let (base, state) = command(false, "linux");
    let first = app("first-app", "First App");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();

    // The engine is never touched and no host-scope entry appears.
    assert_eq!(state.verify_count(), 0);
    assert!(state.builds().is_empty());
    assert!(!base.registry().lock().unwrap().has_tool("docker"));

    let context = base.app_context(&first).unwrap();
    assert!(matches!(context, ExecutionContext::Local(_)));
}

#[tokio::test]
async fn linux_with_docker_binds_container() {
    let (base, state) = command(true, "linux");
    let first = app("first-app", "First App");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();

    assert_eq!(state.verify_count(), 1);

    let context = base.app_context(&first).unwrap();
    let container = match context {
        ExecutionContext::Container(container) => container,
        ExecutionContext::Local(_) => panic!("expected a container context"),
    };

    assert_eq!(container.image_tag, "satchel/com.example.first-app:py3.12");
    // Mount paths are exactly the paths supplied at construction.
    assert_eq!(container.app_base_path, base.base_path);
    assert_eq!(container.host_platform_path, base.platform_path);
    assert_eq!(container.host_data_path, base.data_path);
    // The Dockerfile nests under the app's project directory.
    assert_eq!(
        container.dockerfile_path,
        Path::new("/projects/base_path/linux/appimage/First App/Dockerfile")
    );

    let builds = state.builds();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].0, "satchel/com.example.first-app:py3.12");
}

#[tokio::test]
async fn non_linux_host_binds_container_even_without_flag() {
    let (base, state) = command(false, "macos");
    let first = app("first-app", "First App");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();

    assert_eq!(state.verify_count(), 1);
    let context = base.app_context(&first).unwrap();
    assert!(matches!(context, ExecutionContext::Container(_)));
}

#[tokio::test]
async fn image_tag_is_case_insensitive() {
    let (base, _state) = command(true, "linux");
    let lower = app("first-app", "First App");
    let upper = app("First-App", "FIRST APP");

    assert_eq!(base.docker_image_tag(&lower), base.docker_image_tag(&upper));
    assert_eq!(
        base.docker_image_tag(&upper),
        "satchel/com.example.first-app:py3.12"
    );
}

#[tokio::test]
async fn verify_tools_is_idempotent() {
    let (base, state) = command(true, "linux");

    base.verify_tools().await.unwrap();
    base.verify_tools().await.unwrap();

    assert_eq!(state.verify_count(), 1);
}

#[tokio::test]
async fn engine_verified_once_across_apps() {
    let (base, state) = command(true, "linux");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&app("first-app", "First App"))
        .await
        .unwrap();
    base.verify_app_tools(&app("second-app", "Second App"))
        .await
        .unwrap();

    assert_eq!(state.verify_count(), 1);
    assert_eq!(state.builds().len(), 2);
}

#[tokio::test]
async fn verify_app_tools_is_idempotent() {
    let (base, state) = command(true, "linux");
    let first = app("first-app", "First App");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();
    base.verify_app_tools(&first).await.unwrap();

    // The second call is a no-op: no rebuild, no rebinding.
    assert_eq!(state.builds().len(), 1);
    assert!(matches!(
        base.app_context(&first).unwrap(),
        ExecutionContext::Container(_)
    ));
}

#[tokio::test]
async fn verify_app_tools_requires_host_verification() {
    let (base, state) = command(true, "linux");
    let result = base.verify_app_tools(&app("first-app", "First App")).await;

    assert!(result.is_err());
    assert_eq!(state.verify_count(), 0);
}

#[tokio::test]
async fn image_build_failure_is_scoped_to_one_app() {
    let (base, state) = command(true, "linux");
    let first = app("first-app", "First App");
    let second = app("second-app", "Second App");
    state.fail_builds_containing("second-app");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();
    let result = base.verify_app_tools(&second).await;

    assert!(result.is_err());
    // The first app's binding survives and stays usable.
    assert!(matches!(
        base.app_context(&first).unwrap(),
        ExecutionContext::Container(_)
    ));
    assert!(base.app_context(&second).is_err());
}

#[tokio::test]
async fn cloned_phase_shares_verified_state() {
    let (base, state) = command(true, "linux");
    let first = app("first-app", "First App");

    base.verify_tools().await.unwrap();
    base.verify_app_tools(&first).await.unwrap();

    let derived = base.clone_phase();
    assert!(derived.is_clone);
    assert!(derived.use_docker);
    assert!(Arc::ptr_eq(base.registry(), derived.registry()));

    // The derived phase's explicit verification calls are cheap no-ops.
    derived.verify_tools().await.unwrap();
    derived.verify_app_tools(&first).await.unwrap();
    assert_eq!(state.verify_count(), 1);
    assert_eq!(state.builds().len(), 1);

    assert!(matches!(
        derived.app_context(&first).unwrap(),
        ExecutionContext::Container(_)
    ));
}
