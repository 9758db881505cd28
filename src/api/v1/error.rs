use crate::application_port::AuthError;
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// Wire-level error code. The body shape is uniform for every failure:
/// `{"code": ..., "message": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    BadRequest,
    Unauthorized,
    Conflict,
    Internal,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ApiErrorCode,
    message: String,
}

#[derive(Debug)]
pub struct ApiRejection {
    code: ApiErrorCode,
    message: String,
}

impl reject::Reject for ApiRejection {}

impl ApiRejection {
    pub fn bad_request(message: impl Into<String>) -> Rejection {
        reject::custom(ApiRejection {
            code: ApiErrorCode::BadRequest,
            message: message.into(),
        })
    }

    pub fn bearer_required() -> Rejection {
        reject::custom(ApiRejection {
            code: ApiErrorCode::Unauthorized,
            message: "bearer token required".to_string(),
        })
    }
}

impl From<AuthError> for ApiRejection {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidInput(message) => ApiRejection {
                code: ApiErrorCode::BadRequest,
                message,
            },
            AuthError::AlreadyExists => ApiRejection {
                code: ApiErrorCode::Conflict,
                message: "user already exists".to_string(),
            },
            // Which of the credential/token checks failed is logged, never
            // surfaced to the caller.
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::RevokedToken => {
                debug!(%error, "request unauthorized");
                ApiRejection {
                    code: ApiErrorCode::Unauthorized,
                    message: "unauthorized".to_string(),
                }
            }
            AuthError::Store(detail) | AuthError::Internal(detail) => {
                warn!(%detail, "request failed on a dependency");
                ApiRejection {
                    code: ApiErrorCode::Internal,
                    message: "internal error".to_string(),
                }
            }
        }
    }
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message, status) = if let Some(rej) = err.find::<ApiRejection>() {
        (rej.code, rej.message.clone(), rej.code.status())
    } else if err.is_not_found() {
        (
            ApiErrorCode::BadRequest,
            "not found".to_string(),
            StatusCode::NOT_FOUND,
        )
    } else if err.find::<reject::MissingHeader>().is_some()
        || err.find::<reject::InvalidHeader>().is_some()
    {
        (
            ApiErrorCode::Unauthorized,
            "bearer token required".to_string(),
            StatusCode::UNAUTHORIZED,
        )
    } else if err.find::<warp::body::BodyDeserializeError>().is_some() {
        (
            ApiErrorCode::BadRequest,
            "invalid request body".to_string(),
            StatusCode::BAD_REQUEST,
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            ApiErrorCode::BadRequest,
            "method not allowed".to_string(),
            StatusCode::METHOD_NOT_ALLOWED,
        )
    } else {
        warn!(?err, "unhandled rejection");
        (
            ApiErrorCode::Internal,
            "internal error".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    };

    let json = warp::reply::json(&ErrorBody { code, message });
    Ok(warp::reply::with_status(json, status))
}
