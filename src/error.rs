use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("expense title is empty")]
    EmptyTitle,
    #[error("beneficiary name is empty")]
    EmptyBeneficiaryName,
    #[error("unknown beneficiary rule: {0:?}")]
    UnknownBeneficiary(String),
}

#[derive(Debug, Error)]
pub enum TripError {
    #[error("participant name is empty")]
    EmptyParticipantName,
    #[error("trip ends on {end} before it starts on {start}")]
    EndsBeforeStart { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("bson error: {0}")]
    Bson(#[from] bson::ser::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error(transparent)]
    Invalid(#[from] ExpenseError),
    #[error(transparent)]
    InvalidTrip(#[from] TripError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Invalid(_) | ApiError::InvalidTrip(_) => "validation_error",
            ApiError::Store(_) => "storage_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Invalid(_) | ApiError::InvalidTrip(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Store(err) = self {
            tracing::error!("storage failure: {err}");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        })
    }
}
