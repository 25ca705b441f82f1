//! API Models
//!
//! View models returned by the REST surface, annotated for OpenAPI
//! documentation with `utoipa`.

use crate::registry::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Serializable view of an active relay session.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    /// True when the session negotiated audio output at connect time.
    pub audio: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionInfo {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            audio: session.audio,
            created_at: session.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub message: String,
}
