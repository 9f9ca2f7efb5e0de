use std::sync::Arc;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use log::info;
use serde::de::DeserializeOwned;
use crate::{Error, Movie, MovieFields, MovieStore, Result};
use super::response::{self, Status};

pub type SharedStore = Arc<dyn MovieStore>;

// Rejections are taken by value so they share the JSON envelope.
type PathId = std::result::Result<Path<String>, PathRejection>;
type RawBody = std::result::Result<Bytes, BytesRejection>;

fn parse_id(path: PathId) -> Result<i64> {
    let Path(raw) = path.map_err(|e| Error::Malformed(e.to_string()))?;
    Ok(raw.parse::<i64>()?)
}

/// Decodes the first JSON value in `body` and ignores whatever follows it.
fn decode_first<T: DeserializeOwned>(body: RawBody) -> Result<T> {
    let body = body.map_err(|e| Error::Malformed(e.to_string()))?;
    match serde_json::Deserializer::from_slice(&body).into_iter::<T>().next() {
        Some(value) => Ok(value?),
        None => Err(Error::Malformed("empty request body".to_string())),
    }
}

/// `GET /movies`
pub async fn list_movies(State(store): State<SharedStore>) -> Result<Response> {
    let movies = store.list().await?;
    Ok(response::json(StatusCode::OK, &movies))
}

/// `GET /movies/:id`
pub async fn get_movie(
    State(store): State<SharedStore>,
    path: PathId,
) -> Result<Response> {
    let movie = store.get(parse_id(path)?).await?;
    Ok(response::json(StatusCode::OK, &movie))
}

/// `POST /movies`
///
/// The body is decoded from raw bytes so that a missing or wrong `Content-Type`
/// is not rejected on its own.
pub async fn create_movie(
    State(store): State<SharedStore>,
    body: RawBody,
) -> Result<Status> {
    let candidate: Movie = decode_first(body)?;
    let movie = store.create(candidate).await?;
    info!("Added movie {} {:?}", movie.id, movie.title);
    Ok(Status::Ok)
}

/// `PUT /movies/:id`
///
/// Existence is checked before the body is decoded, so an unknown id wins over a
/// malformed body.
pub async fn update_movie(
    State(store): State<SharedStore>,
    path: PathId,
    body: RawBody,
) -> Result<Status> {
    let id = parse_id(path)?;
    store.get(id).await?;
    let fields: MovieFields = decode_first(body)?;
    store.update(id, fields).await?;
    Ok(Status::Ok)
}

/// `DELETE /movies/:id`
pub async fn delete_movie(
    State(store): State<SharedStore>,
    path: PathId,
) -> Result<Status> {
    store.delete(parse_id(path)?).await?;
    Ok(Status::Ok)
}

/// CORS preflight, answered for every path.
pub async fn preflight() -> Response {
    (
        [
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (ACCESS_CONTROL_ALLOW_METHODS, "PUT, DELETE, POST, GET"),
        ],
        Status::Ok,
    )
        .into_response()
}

/// Unmatched paths get the JSON 404 envelope, except for preflights.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }
    Status::NotFound.into_response()
}
