use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Stored shape. Tour and author are weak references by id.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub review: String,
    pub rating: f64,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create payload. The author comes from the authenticated identity and the
/// tour from the route, never from the body.
#[derive(Debug, Deserialize)]
pub struct NewReview {
    pub review: Option<String>,
    pub rating: Option<f64>,
}

impl NewReview {
    pub fn validate(self, tour_id: Uuid, user_id: Uuid) -> Result<ReviewRecord, ApiError> {
        let review = match self.review {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Err(ApiError::validation("Review can not be empty!")),
        };
        let rating = self
            .rating
            .ok_or_else(|| ApiError::validation("A review must have a rating"))?;
        if !(1.0..=5.0).contains(&rating) {
            return Err(ApiError::validation("Rating must be between 1.0 and 5.0"));
        }
        Ok(ReviewRecord {
            review,
            rating,
            tour_id,
            user_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub review: String,
    pub rating: f64,
    pub tour_id: Uuid,
    pub user_id: Uuid,
}
