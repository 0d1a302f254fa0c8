//! Portal HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the access loader, and the HTTP router, then starts
//! the API server alongside the metrics endpoint.
use anyhow::Context;
use portal::app::{AppState, build_router};
use portal::config::PortalConfig;
use portal::loader::PortalAccessLoader;
use portal::loader::memory::InMemoryAccessLoader;
use portal::observability;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PortalConfig::from_env_or_yaml().context("portal config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: PortalConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("portal")?;
    let state = build_state(config.clone());
    tracing::info!(
        backend = state.loader.backend_name(),
        sections = state.navigation.len(),
        "portal state ready"
    );
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);
    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "portal listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: PortalConfig) -> AppState {
    let loader: Arc<dyn PortalAccessLoader + Send + Sync> =
        Arc::new(InMemoryAccessLoader::new(config.fixtures));
    AppState {
        api_version: "v1".to_string(),
        navigation: Arc::new(config.navigation),
        loader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_access::{PortalAccess, default_navigation};
    use serial_test::serial;
    use std::collections::HashMap;

    fn test_config() -> PortalConfig {
        PortalConfig {
            bind_addr: "127.0.0.1:0".parse().expect("bind"),
            metrics_bind: "127.0.0.1:0".parse().expect("metrics"),
            navigation: default_navigation(),
            fixtures: HashMap::from([(
                "s-1".to_string(),
                PortalAccess::new("u-1").with_staff_workspace(),
            )]),
        }
    }

    #[tokio::test]
    async fn build_state_seeds_loader_from_fixtures() {
        let state = build_state(test_config());
        assert_eq!(state.api_version, "v1");
        assert_eq!(state.loader.backend_name(), "memory");
        let access = state
            .loader
            .load_portal_access("s-1")
            .await
            .expect("load")
            .expect("fixture");
        assert!(access.can_access_staff_workspace);
    }

    #[tokio::test]
    #[serial]
    async fn run_with_shutdown_starts_and_stops() {
        run_with_shutdown(test_config(), async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        })
        .await
        .expect("run should stop cleanly");
    }
}
