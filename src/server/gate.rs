use std::sync::Arc;
use axum::extract::{Request, State};
use axum::http::header::REFERER;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{debug, warn};
use crate::config::AccessConfig;
use super::response::Status;

/// Rejects requests whose `Referer` is not on the allow-list.
///
/// A missing or non-UTF-8 header counts as the empty referer. This is origin
/// filtering on a client-supplied header, not authentication.
pub async fn referer_gate(State(access): State<Arc<AccessConfig>>, req: Request, next: Next) -> Response {
    if !access.is_enabled() {
        debug!("no referers defined or debug enabled");
        return next.run(req).await;
    }

    let referer = req
        .headers()
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !access.allows(referer) {
        warn!("Rejected {} {} from referer {:?}", req.method(), req.uri().path(), referer);
        return Status::Forbidden.into_response();
    }

    next.run(req).await
}
