// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers for the loopback OAuth redirect.

pub mod callback;

use crate::middleware::add_security_headers;
use axum::{middleware, Router};
use callback::CallbackState;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the callback router.
pub fn create_callback_router(state: Arc<CallbackState>) -> Router {
    Router::new()
        .merge(callback::routes())
        .layer(middleware::from_fn(add_security_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}
