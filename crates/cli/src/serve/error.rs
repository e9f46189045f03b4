//! Error responses. Every failure body is `{"error": message, "kind": kind}`.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use problemflow_engine::{ErrorKind, TransitionError};

#[derive(Debug)]
pub(crate) enum ApiError {
    /// The engine rejected the transition.
    Transition(TransitionError),
    /// The request body is not a JSON object.
    InvalidBody(String),
    /// No route matched.
    NoRoute,
    /// No API key presented.
    Unauthorized,
    /// Wrong API key presented.
    Forbidden,
    /// Client exceeded its request budget; retry after this many seconds.
    RateLimited { retry_after: u64 },
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ApiError::Transition(e) => status_for(e.kind()),
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ApiError::Transition(e) => e.kind().as_str(),
            ApiError::InvalidBody(_) => ErrorKind::BadRequest.as_str(),
            ApiError::NoRoute => ErrorKind::NotFound.as_str(),
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden => "forbidden",
            ApiError::RateLimited { .. } => "rate_limited",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Transition(e) => e.to_string(),
            ApiError::InvalidBody(msg) => msg.clone(),
            ApiError::NoRoute => "not found".to_string(),
            ApiError::Unauthorized => "authentication required".to_string(),
            ApiError::Forbidden => "invalid API key".to_string(),
            ApiError::RateLimited { .. } => "rate limit exceeded".to_string(),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(e: TransitionError) -> Self {
        ApiError::Transition(e)
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::ServerFault => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.message(),
            "kind": self.kind(),
        });
        if let ApiError::RateLimited { retry_after } = self {
            body["retry_after"] = retry_after.into();
            let mut response = (self.status(), Json(body)).into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
            return response;
        }
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_engine_kind_has_its_status() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::NotAcceptable), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::BadRequest), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::ServerFault),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limit_carries_retry_after_header() {
        let response = ApiError::RateLimited { retry_after: 17 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "17");
    }

    #[test]
    fn transition_errors_keep_engine_kind() {
        let err = ApiError::from(TransitionError::PermissionDenied {
            number: "PRB0040001".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(err.kind(), "not_acceptable");
    }
}
