use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;
use crate::services::confirmation::ConfirmError;

/// Errors surfaced to HTTP callers. Each variant maps to one status code and
/// renders as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Guest not in the invitation")]
    InvalidMembership,

    #[error("Too many new guests")]
    CapacityExceeded,

    #[error("Not enough plus-one seats in the invitation")]
    Overbooked,

    #[error("{0} not found")]
    InvalidReference(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Guest update failed part way through the batch")]
    PartialBatch { updated: Vec<Uuid>, created: Vec<Uuid> },

    #[error("Database error")]
    Store(#[source] StoreError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated: Option<&'a [Uuid]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<&'a [Uuid]>,
}

impl ApiError {
    /// Map a store failure on a lookup of `entity`: `NotFound` becomes a 404,
    /// anything else a 500.
    pub fn lookup(entity: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |err| match err {
            StoreError::NotFound => ApiError::NotFound(entity),
            other => ApiError::from(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidReference => ApiError::InvalidReference("Invitation"),
            other => ApiError::Store(other),
        }
    }
}

impl From<ConfirmError> for ApiError {
    fn from(err: ConfirmError) -> Self {
        match err {
            ConfirmError::InvitationNotFound => ApiError::NotFound("Invitation"),
            ConfirmError::GuestNotFound { .. } => ApiError::NotFound("Guest"),
            ConfirmError::InvalidMembership { .. } => ApiError::InvalidMembership,
            ConfirmError::CapacityExceeded { .. } => ApiError::CapacityExceeded,
            ConfirmError::Validation(msg) => ApiError::Validation(msg),
            ConfirmError::PartialBatch {
                updated, created, ..
            } => ApiError::PartialBatch { updated, created },
            ConfirmError::Store(err) => ApiError::from(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidMembership
            | ApiError::CapacityExceeded
            | ApiError::Overbooked
            | ApiError::InvalidReference(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PartialBatch { .. } | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Store(err) = self {
            log::error!("store failure: {}", err);
        }

        let (updated, created) = match self {
            ApiError::PartialBatch { updated, created } => {
                (Some(updated.as_slice()), Some(created.as_slice()))
            }
            _ => (None, None),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            detail: self.to_string(),
            updated,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_maps_not_found_to_entity() {
        let err = ApiError::lookup("Guest")(StoreError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Guest not found");

        let err = ApiError::lookup("Guest")(StoreError::Backend("boom".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Database error");
    }

    #[test]
    fn partial_batch_lists_written_records() {
        let id = Uuid::new_v4();
        let err = ApiError::from(ConfirmError::PartialBatch {
            updated: vec![id],
            created: vec![],
            source: StoreError::Backend("gone".into()),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(&err, ApiError::PartialBatch { updated, .. } if updated == &vec![id]));
    }

    #[test]
    fn dangling_reference_is_a_bad_request() {
        let err = ApiError::from(StoreError::InvalidReference);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invitation not found");
    }

    #[test]
    fn workflow_rejections_keep_their_messages() {
        let capacity = ApiError::from(ConfirmError::CapacityExceeded {
            requested: 2,
            available: 1,
        });
        assert_eq!(capacity.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(capacity.to_string(), "Too many new guests");

        let membership = ApiError::from(ConfirmError::InvalidMembership {
            guest_id: Uuid::new_v4(),
        });
        assert_eq!(membership.to_string(), "Guest not in the invitation");

        let missing = ApiError::from(ConfirmError::InvitationNotFound);
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), "Invitation not found");

        let removed = ApiError::from(ConfirmError::GuestNotFound {
            guest_id: Uuid::new_v4(),
        });
        assert_eq!(removed.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(removed.to_string(), "Guest not found");
    }
}
