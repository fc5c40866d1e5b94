use actix_web::{
    http::{header::ToStrError as HEADER_TO_STR_ERROR, StatusCode},
    HttpResponse, ResponseError,
};
use anyhow::Error as ANYHOW_ERROR;
use base64::DecodeError as BASE64_DECODE_ERROR;
use ece::Error as ECE_ERROR;
use jsonwebtoken::errors::Error as JWT_ERROR;
use reqwest::header::{
    InvalidHeaderName as INVALID_HEADER_NAME,
    InvalidHeaderValue as INVALID_HEADER_VALUE,
};
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use sqlx::error::Error as SQL_ERROR;
use std::{
    env::VarError, fmt::Display, io::Error as IO_ERROR, num::ParseIntError,
    str::ParseBoolError as PARSE_BOOL_ERROR,
};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    Base64DecodeError(#[from] BASE64_DECODE_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    ParseBoolError(#[from] PARSE_BOOL_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("{0}")]
    HeaderToStrError(#[from] HEADER_TO_STR_ERROR),

    #[error("{0:#}")]
    AnyHowError(#[from] ANYHOW_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    InvalidHeaderName(#[from] INVALID_HEADER_NAME),

    #[error("{0}")]
    InvalidHeaderValue(#[from] INVALID_HEADER_VALUE),

    #[error("Invalid option {option}")]
    InvalidOption { option: String },

    #[error("Encryption error: {0}")]
    EceError(#[from] ECE_ERROR),

    #[error("{0}")]
    JWT(#[from] JWT_ERROR),

    #[error("Invalid subscription key: {0}")]
    InvalidSubscriptionKey(String),

    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    StorageFailure(&'static str),
}

impl Error {
    /// Logs the underlying storage error and replaces it with a message that
    /// is safe to hand to the client.
    pub fn storage(message: &'static str, err: impl Display) -> Self {
        tracing::error!("{}: {}", message, err);
        Error::StorageFailure(message)
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,

            Error::InvalidSubscription(_)
            | Error::InvalidSubscriptionKey(_)
            | Error::InvalidOption { .. } => StatusCode::BAD_REQUEST,

            Error::ReqwestError(_) => StatusCode::BAD_GATEWAY,

            Error::Io(_)
            | Error::URL(_)
            | Error::INT(_)
            | Error::SQL(_)
            | Error::VAR(_)
            | Error::TokioJoinError(_)
            | Error::Base64DecodeError(_)
            | Error::ConfigurationError(_)
            | Error::JsonError(_)
            | Error::ParseBoolError(_)
            | Error::SetGlobalDefaultError(_)
            | Error::HeaderToStrError(_)
            | Error::AnyHowError(_)
            | Error::InvalidHeaderName(_)
            | Error::InvalidHeaderValue(_)
            | Error::EceError(_)
            | Error::JWT(_)
            | Error::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            Error::Unauthorized
            | Error::StorageFailure(_)
            | Error::InvalidSubscription(_)
            | Error::InvalidSubscriptionKey(_)
            | Error::InvalidOption { .. } => self.to_string(),
            _ => String::from(
                status.canonical_reason().unwrap_or("Internal server error"),
            ),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_of(err: Error) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = response.into_body().try_into_bytes().unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let (status, body) = body_of(Error::Unauthorized);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[test]
    fn storage_failure_hides_the_database_error() {
        let err = Error::storage(
            "Failed to check subscription",
            SQL_ERROR::Protocol(String::from("password for user gnar leaked")),
        );
        let (status, body) = body_of(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to check subscription");
        assert!(!body.to_string().contains("leaked"));
    }

    #[test]
    fn internal_errors_use_a_generic_message() {
        let (status, body) = body_of(Error::SQL(SQL_ERROR::PoolTimedOut));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[test]
    fn invalid_subscription_is_a_client_error() {
        let (status, _) =
            body_of(Error::InvalidSubscription(String::from("endpoint")));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn context_errors_keep_their_cause() {
        let err: Error = anyhow::anyhow!("connection refused")
            .context("Migration V001__users failed")
            .into();
        assert_eq!(
            err.to_string(),
            "Migration V001__users failed: connection refused"
        );
    }
}
