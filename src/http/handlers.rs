//! Route handlers.

use axum::extract::{ConnectInfo, FromRequest, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use std::net::SocketAddr;

use crate::contact::{ContactForm, ContactRelay, RelayError};
use crate::http::response::{iso_timestamp, with_quota, HealthBody, NotFoundBody, SuccessBody};
use crate::security::rate_limit::client_ip;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: ContactRelay,
    pub trust_forwarded_for: bool,
}

/// Contact form body, accepted as JSON or urlencoded form fields.
#[derive(Debug)]
pub struct FormPayload(pub ContactForm);

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(form) = Form::<ContactForm>::from_request(req, state)
                .await
                .map_err(|e| RelayError::MalformedBody(e.body_text()))?;
            Ok(Self(form))
        } else {
            let Json(form) = Json::<ContactForm>::from_request(req, state)
                .await
                .map_err(|e| RelayError::MalformedBody(e.body_text()))?;
            Ok(Self(form))
        }
    }
}

/// `POST /api/send-email`
pub async fn send_email(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<FormPayload, RelayError>,
) -> Response {
    let source = client_ip(peer, &headers, state.trust_forwarded_for);
    let report = state
        .relay
        .submit(source, payload.map(|FormPayload(form)| form))
        .await;

    let response = match report.outcome {
        Ok(_) => (StatusCode::OK, Json(SuccessBody::sent())).into_response(),
        Err(e) => e.into_response(),
    };
    with_quota(response, report.quota)
}

/// `GET /api/health`. Never touches the limiter or the transport.
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "OK",
        message: "Email service is running",
        timestamp: iso_timestamp(),
    })
}

/// Fallback for unknown paths and unsupported methods on known ones.
pub async fn not_found() -> (StatusCode, Json<NotFoundBody>) {
    (StatusCode::NOT_FOUND, Json(NotFoundBody::new()))
}
