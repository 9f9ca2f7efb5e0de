/// HTTP server implementation for the Movies Store daemon.
///
/// This module provides the [`Router`] which builds the axum application, serves it,
/// and flushes the store to disk on shutdown.
pub mod gate;
pub mod handlers;
pub mod response;
pub mod router;

pub use response::Status;
pub use router::{shutdown_signal, Router};
