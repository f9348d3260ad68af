use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use memgate_core::ApiError;
use memgate_protocol::ErrorBody;

/// Route failure rendered as `{status, message}` with a matching status.
#[derive(Debug)]
pub struct ServerError(pub ApiError);

impl From<ApiError> for ServerError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = self.0.body();
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}

/// Uniform body for failures raised by the router itself.
pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status: status.as_u16(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}
