use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Failures talking to the attendance backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors surfaced by the board shell
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board {0} not found")]
    BoardNotFound(String),

    #[error("Board state lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ResponseError for BoardError {
    fn status_code(&self) -> StatusCode {
        match self {
            BoardError::BoardNotFound(_) => StatusCode::NOT_FOUND,
            BoardError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            BoardError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({"success": false, "error": self.to_string()}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_board_maps_to_not_found() {
        let err = BoardError::BoardNotFound("abc".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Board abc not found");
    }

    #[test]
    fn status_errors_name_the_url() {
        let err = BackendError::Status {
            url: "http://api/villages/1/members".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        assert!(err.to_string().contains("villages/1/members"));
        assert!(err.to_string().contains("500"));
    }
}
