use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conftree_core::{ConfigStore, MemoryStore, NodePath, Settings, SubscriberManager};
use conftree_web::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,conftree_web=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("conftree server starting...");

    let settings = load_settings()?;
    let addr: SocketAddr = settings.server.bind_addr().parse()?;
    let manager = settings.subscribers.manager()?;

    let mut store = MemoryStore::new("rep:root");
    bootstrap_store(&mut store, &manager)?;

    let state = AppState::new(store, manager);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("conftree server listening on {}", addr);
    tracing::info!("Try these commands:");
    tracing::info!(
        "   curl -X PUT 'http://{}/subscribers/v1/acme?url=https://acme.example/hook'",
        addr
    );
    tracing::info!("   curl -X DELETE 'http://{}/subscribers/v1'", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Load settings from the file named by `CONFTREE_SETTINGS`, or fall back
/// to the defaults.
fn load_settings() -> anyhow::Result<Settings> {
    match std::env::var("CONFTREE_SETTINGS") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            let settings = Settings::from_json(&json)?;
            tracing::info!("loaded settings from {}", path);
            Ok(settings)
        }
        Err(_) => {
            tracing::info!("CONFTREE_SETTINGS not set, using default settings");
            Ok(Settings::default())
        }
    }
}

/// Create the base path chain and a deactivated template node if absent,
/// then commit. A real deployment imports its template subtree into the
/// store; this bootstrap just guarantees the endpoints have something to
/// clone from on a fresh store.
fn bootstrap_store(store: &mut MemoryStore, manager: &SubscriberManager) -> anyhow::Result<()> {
    let base = manager.base_path().clone();

    let mut current = NodePath::root();
    for segment in base.segments() {
        let next = current.join(segment);
        if !store.exists(&next) {
            store.add_child(&current, segment, "mgnl:content")?;
        }
        current = next;
    }

    let template = manager.template_path();
    if !store.exists(template) {
        let name = template.name().to_string();
        let created = store.add_child(&base, &name, "mgnl:contentNode")?;
        store.set_property(&created, "URL", "")?;
        store.set_property(&created, "active", "false")?;
        tracing::info!("created template node at {}", created);
    }

    store.commit()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down...");
}
