pub mod auth;
pub mod reviews;
pub mod tours;
pub mod users;

use axum::http::Uri;
use uuid::Uuid;

use crate::error::ApiError;

/// Route ids are uuids; anything else on an `:id` segment is reported the
/// same way as an unmatched path.
pub(crate) fn parse_id(raw: &str, uri: &Uri) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::not_found(format!("Can't find {} on this server!", uri.path())))
}
