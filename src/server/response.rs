use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, VARY,
};
use hyper::{Body, Response, StatusCode};
use log::{error, warn};
use serde::Serialize;

use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: &'static str,
    kind: &'static str,
    error: &'a str,
}

pub fn raw_json_response<B: Into<Bytes>>(status: StatusCode, body: B) -> Response<Body> {
    let mut response = Response::new(Body::from(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> GatewayResult<Response<Body>> {
    let body = serde_json::to_vec(value)?;
    Ok(raw_json_response(status, body))
}

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Answers a CORS preflight, echoing the headers the browser asked to send.
pub fn preflight_response(requested_headers: Option<&HeaderValue>) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    let allowed = requested_headers
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("content-type"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, allowed);
    headers.insert(
        VARY,
        HeaderValue::from_static("Access-Control-Request-Method, Access-Control-Request-Headers"),
    );
    response
}

pub fn allow_any_origin(response: &mut Response<Body>) {
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

pub fn error_response(err: &GatewayError) -> Response<Body> {
    let status = err.status();
    if status.is_server_error() {
        error!("{err}");
    } else {
        warn!("{err}");
    }
    let message = err.to_string();
    let body = ErrorBody {
        status: "ERROR",
        kind: err.kind().as_str(),
        error: &message,
    };
    match serde_json::to_vec(&body) {
        Ok(body) => raw_json_response(status, body),
        Err(e) => {
            error!("cannot encode error response: {e}");
            raw_json_response(status, Bytes::new())
        }
    }
}
