use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Errors that know which status code they should be answered with.
pub trait ApiRequestError: std::error::Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode;
}

pub enum AppError {
    /// Something the caller can act on; its message is sent back verbatim.
    Request { status: StatusCode, msg: String },

    /// Unexpected failure. Only `msg` reaches the client, `error` is logged.
    Server {
        msg: &'static str,
        error: Box<dyn std::error::Error + Send + Sync>,

        #[cfg(debug_assertions)]
        backtrace: backtrace::Backtrace,
    },
}

impl AppError {
    pub fn server(
        msg: &'static str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Server {
            msg,
            error: Box::new(error),

            #[cfg(debug_assertions)]
            backtrace: backtrace::Backtrace::new(),
        }
    }

    /// Client errors keep their own message, server errors are replaced with
    /// `fallback_msg`.
    pub fn from_request_error<E: ApiRequestError>(error: E, fallback_msg: &'static str) -> Self {
        let status = error.status_code();
        if status.is_server_error() {
            AppError::server(fallback_msg, error)
        } else {
            AppError::Request {
                status,
                msg: error.to_string(),
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    ok: bool,
    msg: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, msg) = match self {
            AppError::Request { status, msg } => (status, msg),
            AppError::Server {
                msg,
                error,
                #[cfg(debug_assertions)]
                backtrace,
            } => {
                #[cfg(debug_assertions)]
                {
                    let frames = filter_backtrace(&backtrace);
                    tracing::error!(error = %error, ?frames, "{msg}");
                }
                #[cfg(not(debug_assertions))]
                tracing::error!(error = %error, "{msg}");

                (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string())
            }
        };

        (status_code, Json(ErrorResponse { ok: false, msg })).into_response()
    }
}

impl From<(&'static str, StatusCode)> for AppError {
    fn from((msg, status): (&'static str, StatusCode)) -> Self {
        AppError::Request {
            status,
            msg: msg.into(),
        }
    }
}

impl From<(String, StatusCode)> for AppError {
    fn from((msg, status): (String, StatusCode)) -> Self {
        AppError::Request { status, msg }
    }
}

#[cfg(debug_assertions)]
#[derive(Debug)]
#[allow(dead_code)]
struct FrameInfo {
    name: String,
    loc: String,
}

#[cfg(debug_assertions)]
fn filter_backtrace(backtrace: &backtrace::Backtrace) -> Vec<FrameInfo> {
    const MODULE_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::");
    let mut frames_info: Vec<FrameInfo> = Vec::new();

    for frame in backtrace.frames() {
        for symbol in frame.symbols() {
            if let (Some(name), Some(filename), Some(lineno)) = (
                symbol.name().map(|n| n.to_string()),
                symbol.filename().map(|f| f.to_owned()),
                symbol.lineno(),
            ) {
                if name.contains(MODULE_PREFIX) {
                    frames_info.push(FrameInfo {
                        name,
                        loc: format!("{}:{}", filename.display(), lineno),
                    });
                }
            }
        }
    }

    frames_info
}
