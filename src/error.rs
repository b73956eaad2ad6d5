use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// The token was valid, but the profile it names is gone or was renamed.
    #[error("Profile not found")]
    TokenProfileMissing,

    #[error("Invalid name or password")]
    InvalidCredentials,

    #[error("Unauthorized to edit this profile")]
    Forbidden,

    #[error("Name and password are required")]
    MissingCredentials,

    #[error("Profile name already exists")]
    NameTaken,

    #[error("Invalid profile ID")]
    InvalidProfileId,

    #[error("Search query is required")]
    EmptySearchQuery,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Upload exceeds the {limit_mib} MiB limit")]
    PayloadTooLarge { limit_mib: usize },

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("{message}")]
    Upstream { message: String, details: String },

    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::TokenProfileMissing
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MissingCredentials
            | Self::NameTaken
            | Self::InvalidProfileId
            | Self::EmptySearchQuery
            | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { .. } | Self::Sqlx(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Unauthorized | Self::InvalidToken | Self::TokenExpired => (
                status,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                Json(ErrorBody {
                    error: self.to_string(),
                    details: None,
                }),
            )
                .into_response(),
            Self::Upstream {
                ref message,
                ref details,
            } => {
                tracing::error!(details = %details, "{message}");
                (
                    status,
                    Json(ErrorBody {
                        error: message.clone(),
                        details: Some(details.clone()),
                    }),
                )
                    .into_response()
            }
            Self::Sqlx(ref e) => {
                tracing::error!("Database error: {:?}", e);
                server_error(status, self.to_string())
            }
            Self::Anyhow(ref e) => {
                tracing::error!("Generic error: {:?}", e);
                server_error(status, e.to_string())
            }
            _ => (
                status,
                Json(ErrorBody {
                    error: self.to_string(),
                    details: None,
                }),
            )
                .into_response(),
        }
    }
}

fn server_error(status: StatusCode, details: String) -> Response {
    (
        status,
        Json(ErrorBody {
            error: "Server error".to_string(),
            details: Some(details),
        }),
    )
        .into_response()
}
