//! Movies Store is a small HTTP service over a single in-memory collection of movies.
//!
//! The collection lives in memory for the whole process lifetime. It is loaded from a
//! flat JSON file at startup and written back to that file once, on graceful shutdown.
//!
//! ## Core Components
//! - [`model`]: The movie record and its lenient JSON decoding.
//! - [`engine`]: The record store and its file persistence.
//! - [`config`]: The referer allow-list used by the access gate.
//! - [`server`]: HTTP routing, the access gate, handlers and the shutdown lifecycle.

pub mod config;
pub mod engine;
pub mod model;
pub mod server;

pub use model::{Movie, MovieFields};

use async_trait::async_trait;
use std::num::ParseIntError;
use thiserror::Error;

/// Errors returned by the Movies Store.
#[derive(Error, Debug)]
pub enum Error {
    /// No movie carries the requested id.
    #[error("movie not found")]
    NotFound,
    /// The request's referer is not on the allow-list.
    #[error("referer not allowed")]
    Forbidden,
    /// A path id did not parse as an integer.
    #[error("invalid movie id: {0}")]
    InvalidId(#[from] ParseIntError),
    /// The request path or body could not be read.
    #[error("malformed request: {0}")]
    Malformed(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred while reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for Movies Store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Read operations over the movie collection.
#[async_trait]
pub trait MovieReader: Send + Sync {
    /// Returns every movie in insertion order.
    async fn list(&self) -> Result<Vec<Movie>>;
    /// Returns the movie with the given id.
    async fn get(&self, id: i64) -> Result<Movie>;
}

/// Write operations over the movie collection.
#[async_trait]
pub trait MovieWriter: Send + Sync {
    /// Appends a movie, assigning the next free id when `candidate.id` is zero.
    async fn create(&self, candidate: Movie) -> Result<Movie>;
    /// Replaces title and rating of the movie with the given id.
    async fn update(&self, id: i64, fields: MovieFields) -> Result<Movie>;
    /// Removes the movie with the given id.
    async fn delete(&self, id: i64) -> Result<()>;
}

/// The full interface the HTTP handlers are written against.
pub trait MovieStore: MovieReader + MovieWriter {}

impl<T: MovieReader + MovieWriter> MovieStore for T {}
