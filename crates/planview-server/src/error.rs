use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use planview_core::PlanviewError;

/// Route error that renders as a JSON body with a mapped status code.
///
/// Core errors carry their own mapping; anything unrecognized is a 500.
pub struct AppError(pub anyhow::Error);

#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BadRequestError {}

#[derive(Debug)]
struct ConflictError(String);

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConflictError {}

#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NotFoundError {}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError(anyhow::Error::new(BadRequestError(message.into())))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError(anyhow::Error::new(ConflictError(message.into())))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError(anyhow::Error::new(NotFoundError(message.into())))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.downcast_ref::<BadRequestError>().is_some() {
            StatusCode::BAD_REQUEST
        } else if self.0.downcast_ref::<ConflictError>().is_some() {
            StatusCode::CONFLICT
        } else if self.0.downcast_ref::<NotFoundError>().is_some() {
            StatusCode::NOT_FOUND
        } else if let Some(core) = self.0.downcast_ref::<PlanviewError>() {
            match core {
                PlanviewError::TaskNotFound(_) | PlanviewError::PlanNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                PlanviewError::NotAPlanFile(_)
                | PlanviewError::InvalidStatus(_)
                | PlanviewError::InvalidMode(_) => StatusCode::BAD_REQUEST,
                PlanviewError::Io(_) | PlanviewError::Yaml(_) | PlanviewError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}
