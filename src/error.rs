use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not Found")]
    NotFound,

    /// 唯一约束冲突，例如 slug 重复
    #[error("{0}")]
    ConstraintViolation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// 请求参数缺失或非法，在访问存储之前检出
    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl Error {
    /// 将 sqlx 的唯一约束错误转换为 [`Error::ConstraintViolation`]
    pub(crate) fn from_insert(e: sqlx::Error, what: impl FnOnce() -> String) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::ConstraintViolation(what())
            }
            e => Error::Sqlx(e),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::ConstraintViolation(_) => StatusCode::CONFLICT,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            Error::Sqlx(e) => {
                tracing::error!(%e, "sqlx error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "status": "error", "error": message }))).into_response()
    }
}
