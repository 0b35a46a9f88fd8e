//! HTTP servers for the doctor directory and booking agents, using Axum.

pub mod handler;

use crate::config::{ListenAddr, ServerConfig};
use crate::core::{BookingAgent, DataStore, DoctorDirectoryAgent, SharedStore};
use crate::domain::ports::Agent;
use crate::utils::error::{AgentError, Result};
use axum::{
    routing::{get, post},
    Router,
};
use handler::{handle_health, handle_message, AgentState};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RunMode {
    /// Doctor Directory Agent only
    Doctor,
    /// Medical Booking Agent only
    Booking,
    /// Both agents sharing one store
    Both,
}

/// Routes served by every agent.
pub fn agent_router(agent: Arc<dyn Agent>) -> Router {
    Router::new()
        .route("/", post(handle_message))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(AgentState { agent })
}

/// A bound listener waiting to be served.
pub struct BoundAgent {
    pub agent: Arc<dyn Agent>,
    pub listener: TcpListener,
}

impl BoundAgent {
    pub async fn bind(agent: Arc<dyn Agent>, listen: &ListenAddr) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", listen.host, listen.port)
            .parse()
            .map_err(|e| AgentError::InvalidConfigValueError {
                field: "host".to_string(),
                value: format!("{}:{}", listen.host, listen.port),
                reason: format!("{}", e),
            })?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { agent, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let name = self.agent.name();
        info!("🏥 {} listening on http://{}", name, addr);
        info!("   Health check: http://{}/health", addr);
        axum::serve(self.listener, agent_router(self.agent))
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("{} stopped", name);
        Ok(())
    }
}

/// Agents for `mode`, all backed by `store`.
pub fn build_agents(mode: RunMode, store: SharedStore) -> Vec<(Arc<dyn Agent>, AgentSlot)> {
    let doctor = || -> (Arc<dyn Agent>, AgentSlot) {
        (
            Arc::new(DoctorDirectoryAgent::new(store.clone())),
            AgentSlot::Doctor,
        )
    };
    let booking = || -> (Arc<dyn Agent>, AgentSlot) {
        (Arc::new(BookingAgent::new(store.clone())), AgentSlot::Booking)
    };
    match mode {
        RunMode::Doctor => vec![doctor()],
        RunMode::Booking => vec![booking()],
        RunMode::Both => vec![doctor(), booking()],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentSlot {
    Doctor,
    Booking,
}

/// Running servers; dropping the handle does not stop them.
pub struct RunningAgents {
    pub addrs: Vec<(AgentSlot, SocketAddr)>,
    shutdown: tokio::sync::watch::Sender<bool>,
    tasks: Vec<tokio::task::JoinHandle<Result<()>>>,
}

impl RunningAgents {
    pub fn addr(&self, slot: AgentSlot) -> Option<SocketAddr> {
        self.addrs
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, addr)| *addr)
    }

    /// Signals every server and waits for them to drain.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown.send(true);
        self.join().await
    }

    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            task.await.map_err(|e| AgentError::ServerError {
                message: format!("server task failed: {}", e),
            })??;
        }
        Ok(())
    }
}

/// Binds every agent of the configured mode and serves them in the background.
pub async fn start_agents(config: &ServerConfig) -> Result<RunningAgents> {
    let store = DataStore::new(config.doctors.clone()).into_shared();
    let (tx, rx) = tokio::sync::watch::channel(false);

    let mut bound = Vec::new();
    for (agent, slot) in build_agents(config.mode, store) {
        let listen = match slot {
            AgentSlot::Doctor => &config.doctor,
            AgentSlot::Booking => &config.booking,
        };
        bound.push((slot, BoundAgent::bind(agent, listen).await?));
    }

    let mut addrs = Vec::new();
    let mut tasks = Vec::new();
    for (slot, agent) in bound {
        addrs.push((slot, agent.local_addr()?));
        let mut rx = rx.clone();
        tasks.push(tokio::spawn(agent.serve(async move {
            let _ = rx.wait_for(|stop| *stop).await;
        })));
    }

    Ok(RunningAgents {
        addrs,
        shutdown: tx,
        tasks,
    })
}

/// Runs until Ctrl-C or SIGTERM, then shuts the servers down gracefully.
pub async fn run(config: &ServerConfig) -> Result<()> {
    info!("🏥 Starting Medical Appointment agents ({:?} mode)", config.mode);
    let running = start_agents(config).await?;
    shutdown_signal().await;
    info!("Shutdown signal received, stopping agents");
    running.shutdown().await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
