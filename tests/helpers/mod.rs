//! Shared helpers for driving the router in-process.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use product_form::app_state::AppState;
use product_form::routes;
use product_form::services::cart::CartService;
use product_form::services::csrf::CsrfTokens;

pub const BODY_LIMIT: usize = 64 * 1024;

pub fn app(csrf_enabled: bool, cart: impl CartService + 'static) -> Router {
    let state = AppState::new(CsrfTokens::ephemeral(3600), csrf_enabled, cart);
    routes::router(state, BODY_LIMIT)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

pub async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let json = serde_json::from_str(&body).unwrap_or_else(|e| panic!("not JSON ({e}): {body}"));
    (status, json)
}

/// Fetch a fresh CSRF token the way an API client would.
pub async fn fetch_token(app: &Router, path: &str) -> String {
    let request = Request::get(path)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .expect("request");
    let (_, body) = send_json(app, request).await;
    body["csrf_token"]
        .as_str()
        .expect("token in response")
        .to_string()
}

pub fn post_form(path: &str, body: impl Into<String>) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.into()))
        .expect("request")
}

pub fn post_json(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Pull the hidden token out of a rendered page.
pub fn token_from_html(html: &str) -> String {
    let marker = r#"name="add_to_cart[_token]" value=""#;
    let start = html.find(marker).expect("token field rendered") + marker.len();
    let end = html[start..].find('"').expect("closing quote") + start;
    html[start..end].to_string()
}
