//! axum integration.
//!
//! - [`translations_middleware`] builds the request context before the
//!   handler runs and stores it in the request extensions
//! - [`Translator`] extracts it in handlers
//! - [`router`] is the small HTTP surface used by `translations serve`

use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::context::SharedContext;
use crate::translator::Translations;

/// Resolve the locale and load dictionaries for every request.
///
/// A dictionary that cannot be loaded fails the request with 500.
pub async fn translations_middleware(
    State(translations): State<Arc<Translations>>,
    mut request: Request,
    next: Next,
) -> Response {
    match translations.begin_request(request.headers()) {
        Ok(ctx) => {
            request.extensions_mut().insert(SharedContext::new(ctx));
            next.run(request).await
        }
        Err(e) => {
            error!("Failed to load translations for request: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Request context extractor.
#[derive(Debug, Clone)]
pub struct Translator(pub SharedContext);

impl Deref for Translator {
    type Target = crate::context::RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Translator
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SharedContext>()
            .cloned()
            .map(Translator)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "translations middleware is not installed",
            ))
    }
}

/// Routes exposing the lookup over HTTP, wrapped in the middleware.
pub fn router(translations: Arc<Translations>) -> Router {
    Router::new()
        .route("/locale", get(locale_handler))
        .route("/translate/:domain/:key", get(translate_handler))
        .layer(middleware::from_fn_with_state(
            translations,
            translations_middleware,
        ))
}

async fn locale_handler(t: Translator) -> Json<serde_json::Value> {
    Json(json!({ "locale": t.locale() }))
}

/// Query parameters become `{name}` placeholders, in query order.
async fn translate_handler(
    t: Translator,
    Path((domain, key)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<serde_json::Value> {
    let translation = if params.is_empty() {
        t.translate(&key, &domain)
    } else {
        let params = params
            .into_iter()
            .map(|(name, value)| (format!("{{{name}}}"), value));
        t.translate_with(&key, &domain, params)
    };

    Json(json!({
        "locale": t.locale(),
        "key": key,
        "translation": translation,
    }))
}
