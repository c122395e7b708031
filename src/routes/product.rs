use axum::body::Bytes;
use axum::extract::{FromRequest, Request, State};
use axum::http::{header, HeaderMap, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde_json::Value;
use std::convert::Infallible;
use tracing::{error, warn};

use crate::app_state::AppState;
use crate::models::form::{FormErrors, FormResponse};
use crate::models::product::AddToCart;
use crate::services::binding::Submission;
use crate::services::form_builder::{CSRF_TOKEN_ID, FORM_NAME};
use crate::services::form_handler::{self, BoundForm, FormContext, Outcome};
use crate::services::render::{self, Banner, PageView};

/// Form data pulled from a request body, if the form was submitted at all.
///
/// Extraction never rejects: an undecodable body becomes an unreadable
/// submission so the handler can report it on the form.
pub struct SubmittedForm(pub Option<Submission>);

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type(req.headers()).to_string();

        let submission = if content_type.starts_with("application/json") {
            match Json::<Value>::from_request(req, state).await {
                Ok(Json(body)) => Submission::from_json(FORM_NAME, &body),
                Err(rejection) => {
                    warn!(error = %rejection, "Unreadable JSON submission");
                    Some(Submission::unreadable())
                }
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            match Form::<Vec<(String, String)>>::from_request(req, state).await {
                Ok(Form(pairs)) => Submission::from_pairs(FORM_NAME, pairs),
                Err(rejection) => {
                    warn!(error = %rejection, "Unreadable form submission");
                    Some(Submission::unreadable())
                }
            }
        } else {
            let body = Bytes::from_request(req, state).await.unwrap_or_default();
            if body.is_empty() {
                None
            } else {
                warn!(content_type = %content_type, "Submission in unsupported format");
                Some(Submission::unreadable())
            }
        };

        Ok(Self(submission))
    }
}

/// GET /product — render the empty form.
pub async fn show_form(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    handle(&state, uri.path(), &headers, None)
}

/// POST /product — bind, validate and add to cart, then re-render.
pub async fn submit_form(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    SubmittedForm(submission): SubmittedForm,
) -> Response {
    handle(&state, uri.path(), &headers, submission.as_ref())
}

fn handle(
    state: &AppState,
    path: &str,
    headers: &HeaderMap,
    submission: Option<&Submission>,
) -> Response {
    let ctx = FormContext {
        definition: &state.form,
        csrf: state.csrf_guard(),
        cart: state.cart.as_ref(),
    };
    let (mut form, outcome) = form_handler::process(&ctx, submission);

    metrics::counter!("product_form_submissions_total", "outcome" => outcome.as_ref().to_string())
        .increment(1);

    let token = state
        .csrf
        .issue(CSRF_TOKEN_ID)
        .map_err(|e| error!(error = %e, "Failed to issue CSRF token"))
        .ok();

    let response = if wants_json(headers) {
        json_response(&form, &outcome, token)
    } else {
        html_response(&form, &outcome, token.as_deref(), path)
    };

    form.respond();
    response
}

fn json_response(form: &BoundForm<'_>, outcome: &Outcome, csrf_token: Option<String>) -> Response {
    let receipt = match outcome {
        Outcome::Added(receipt) => Some(receipt.clone()),
        _ => None,
    };
    Json(FormResponse {
        state: form.state(),
        values: form.model().clone(),
        receipt,
        errors: form.errors().fields.clone(),
        form_errors: form.errors().form.clone(),
        csrf_token,
    })
    .into_response()
}

fn html_response(
    form: &BoundForm<'_>,
    outcome: &Outcome,
    csrf_token: Option<&str>,
    action: &str,
) -> Response {
    let html = match outcome {
        Outcome::Added(receipt) => {
            // Start over with a fresh form once the line is in the cart.
            let fresh = AddToCart::default();
            let errors = FormErrors::default();
            render::page(&PageView {
                form: form.definition(),
                model: &fresh,
                errors: &errors,
                csrf_token,
                banners: vec![Banner::success(format!(
                    "Added {} × {} to your cart.",
                    receipt.quantity,
                    receipt.color.label()
                ))],
                action,
                submitted: false,
            })
        }
        _ => render::page(&PageView {
            form: form.definition(),
            model: form.model(),
            errors: form.errors(),
            csrf_token,
            banners: Vec::new(),
            action,
            submitted: form.is_submitted(),
        }),
    };
    Html(html).into_response()
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// JSON in, or JSON explicitly asked for, means JSON out.
fn wants_json(headers: &HeaderMap) -> bool {
    content_type(headers).starts_with("application/json")
        || headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"))
}
