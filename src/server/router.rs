use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use crate::config::AccessConfig;
use crate::engine::Persistence;
use crate::{Error, MovieStore, Result};
use super::gate::referer_gate;
use super::handlers::{self, SharedStore};
use super::response::Status;

/// Ceiling for reading a request body and running its handler.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// How long in-flight requests may keep running once shutdown has begun.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub struct Router {
    store: SharedStore,
    access: Arc<AccessConfig>,
}

impl Router {
    pub fn new(store: Arc<dyn MovieStore>, access: AccessConfig) -> Self {
        if !access.is_enabled() {
            warn!("No referers configured; access gate is disabled");
        }
        Self {
            store,
            access: Arc::new(access),
        }
    }

    /// Builds the axum application: routes, fallback and middleware stack.
    pub fn app(&self) -> axum::Router {
        axum::Router::new()
            .route(
                "/movies",
                get(handlers::list_movies)
                    .post(handlers::create_movie)
                    .options(handlers::preflight),
            )
            .route(
                "/movies/:id",
                get(handlers::get_movie)
                    .put(handlers::update_movie)
                    .delete(handlers::delete_movie)
                    .options(handlers::preflight),
            )
            .route("/", axum::routing::options(handlers::preflight))
            .fallback(handlers::fallback)
            .with_state(self.store.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(middleware::from_fn_with_state(self.access.clone(), referer_gate))
            .layer(middleware::from_fn(request_deadline))
            .layer(middleware::from_fn(access_log))
    }

    /// Binds `0.0.0.0:<port>` and serves until SIGINT or SIGTERM.
    pub async fn listen(&self, port: &str, persistence: &Persistence) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("Movies Store listening on port {}", port);
        self.serve(listener, persistence, shutdown_signal()).await
    }

    /// Serves on `listener` until `shutdown` resolves.
    ///
    /// On shutdown the store is saved first, then the server stops accepting
    /// connections and waits up to [`SHUTDOWN_GRACE`] for in-flight requests before
    /// aborting them. A failed save is logged and does not change the outcome.
    pub async fn serve<F>(&self, listener: TcpListener, persistence: &Persistence, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let stop = Arc::new(Notify::new());
        let server = axum::serve(listener, self.app()).with_graceful_shutdown({
            let stop = stop.clone();
            async move { stop.notified().await }
        });
        let mut handle = tokio::spawn(async move { server.await });

        tokio::select! {
            res = &mut handle => {
                return match res {
                    Ok(res) => res.map_err(Error::from),
                    Err(e) => Err(Error::Internal(e.to_string())),
                };
            }
            _ = shutdown => {}
        }

        info!("Shutdown signal received. Saving movie database to {:?}...", persistence.path());
        if let Err(e) = self.save(persistence).await {
            error!("Failed to save db to file: {}", e);
        }

        stop.notify_one();
        let drained = tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await;
        match drained {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => error!("Server error during shutdown: {}", e),
            Ok(Err(e)) => error!("Server task failed: {}", e),
            Err(_) => {
                warn!("Connections still open after {:?}; closing them", SHUTDOWN_GRACE);
                handle.abort();
            }
        }
        info!("shutting down");
        Ok(())
    }

    async fn save(&self, persistence: &Persistence) -> Result<()> {
        let movies = self.store.list().await?;
        let persistence = persistence.clone();
        tokio::task::spawn_blocking(move || persistence.save(&movies))
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for interrupt: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn request_deadline(req: Request, next: Next) -> Response {
    match tokio::time::timeout(REQUEST_TIMEOUT, next.run(req)).await {
        Ok(resp) => resp,
        Err(_) => {
            warn!("Request exceeded {:?}", REQUEST_TIMEOUT);
            Status::InternalServerError.into_response()
        }
    }
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();
    let resp = next.run(req).await;
    info!("{} {} {} {:?}", method, path, resp.status().as_u16(), started.elapsed());
    resp
}
