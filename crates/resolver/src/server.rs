//! HTTP server lifecycle
//!
//! Every accepted connection is served on its own task, tracked in a
//! `JoinSet`. A connection that sits between requests for longer than the idle
//! timeout is closed.
//!
//! Shutdown order: stop accepting, ask every connection to finish its in-flight
//! requests, wait up to the grace period, then close the store and abort the
//! connections still running. Once the store is closed it refuses every call,
//! so nothing reaches Redis after shutdown.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tower::ServiceExt;

use crate::routes::create_router;
use crate::state::AppState;

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&state.config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", state.config.bind_address))?;

    serve(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let grace = state.config.shutdown_timeout;
    let idle_timeout = state.config.idle_timeout;
    let store = state.store.clone();
    let router = create_router(state);
    let addr = listener.local_addr().context("Listener has no local address")?;
    let builder = Builder::new(TokioExecutor::new());

    let (stop_tx, stop_rx) = watch::channel(());
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    tracing::info!(addr = %addr, "Tenant resolver listening");

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _peer)) => {
                    connections.spawn(serve_connection(
                        builder.clone(),
                        stream,
                        router.clone(),
                        idle_timeout,
                        stop_rx.clone(),
                    ));
                }
                Err(err) => {
                    // Usually fd exhaustion; back off instead of spinning
                    tracing::warn!(error = %err, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    tracing::info!(grace = ?grace, connections = connections.len(), "Shutting down server...");
    let _ = stop_tx.send(());

    let drained = tokio::time::timeout(grace, async {
        while connections.join_next().await.is_some() {}
    })
    .await;

    store.close().await;

    if drained.is_err() {
        tracing::warn!(
            connections = connections.len(),
            "Grace period elapsed, aborting remaining connections"
        );
        connections.shutdown().await;
    }

    tracing::info!("Server exited");
    Ok(())
}

async fn serve_connection(
    builder: Builder<TokioExecutor>,
    stream: TcpStream,
    router: Router,
    idle_timeout: Duration,
    mut stop: watch::Receiver<()>,
) {
    let activity = Arc::new(Activity::new());

    let service = {
        let activity = activity.clone();
        hyper::service::service_fn(move |request: Request<Incoming>| {
            let busy = activity.begin();
            let router = router.clone();
            async move {
                let response = router.oneshot(request).await;
                drop(busy);
                response
            }
        })
    };

    let conn = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(err) = result {
                tracing::debug!(error = %err, "Connection error");
            }
            return;
        }
        _ = stop.changed() => {}
        () = activity.idle(idle_timeout) => {
            tracing::debug!(idle = ?idle_timeout, "Closing idle connection");
        }
    }

    // Finishes in-flight requests, then closes
    conn.as_mut().graceful_shutdown();
    if let Err(err) = conn.await {
        tracing::debug!(error = %err, "Connection error during shutdown");
    }
}

/// Request activity on one connection
struct Activity {
    in_flight: AtomicUsize,
    quiet_since: Mutex<Instant>,
}

impl Activity {
    fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            quiet_since: Mutex::new(Instant::now()),
        }
    }

    fn begin(self: &Arc<Self>) -> Busy {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        Busy(self.clone())
    }

    fn quiet_since(&self) -> Instant {
        match self.quiet_since.lock() {
            Ok(since) => *since,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Resolves once no request has been in flight for `timeout`
    async fn idle(&self, timeout: Duration) {
        loop {
            let deadline = if self.in_flight.load(Ordering::Acquire) == 0 {
                self.quiet_since() + timeout
            } else {
                Instant::now() + timeout
            };
            tokio::time::sleep_until(deadline).await;

            if self.in_flight.load(Ordering::Acquire) == 0
                && self.quiet_since().elapsed() >= timeout
            {
                return;
            }
        }
    }
}

/// Marks a request in flight until dropped
struct Busy(Arc<Activity>);

impl Drop for Busy {
    fn drop(&mut self) {
        if let Ok(mut since) = self.0.quiet_since.lock() {
            *since = Instant::now();
        }
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
