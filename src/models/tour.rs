use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Difficult => "difficult",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "difficult" => Ok(Difficulty::Difficult),
            other => Err(format!("unknown difficulty `{}`", other)),
        }
    }
}

/// GeoJSON-ish point used for the start location and waypoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "point_type")]
    pub geo_type: String,
    pub coordinates: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
}

fn point_type() -> String {
    "Point".to_string()
}

/// Stored shape. Guides are weak references kept as plain ids and resolved
/// into summaries at read time, never embedded.
#[derive(Debug, Clone, Serialize)]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub secret: bool,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_location: Option<GeoPoint>,
    pub locations: Vec<GeoPoint>,
    #[serde(skip_serializing)]
    pub guide_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Tour {
    pub fn duration_weeks(&self) -> f64 {
        self.duration as f64 / 7.0
    }
}

/// Read view: the stored tour plus the computed fields the API exposes.
#[derive(Debug, Serialize)]
pub struct TourView {
    #[serde(flatten)]
    pub tour: Tour,
    pub duration_weeks: f64,
    pub guides: Vec<GuideSummary>,
}

impl TourView {
    pub fn new(tour: Tour, guides: Vec<GuideSummary>) -> Self {
        let duration_weeks = tour.duration_weeks();
        Self {
            tour,
            duration_weeks,
            guides,
        }
    }
}

/// Embedded guide summary produced by weak-reference resolution.
#[derive(Debug, Clone, Serialize)]
pub struct GuideSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for GuideSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Create payload; also the merged draft an update produces before the
/// before-save hook validates it.
#[derive(Debug, Deserialize)]
pub struct NewTour {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,
    pub start_location: Option<GeoPoint>,
    #[serde(default)]
    pub locations: Vec<GeoPoint>,
    #[serde(default)]
    pub guides: Vec<Uuid>,
    pub ratings_average: Option<f64>,
    #[serde(default)]
    pub secret: bool,
}

impl NewTour {
    pub fn validate(self) -> Result<TourRecord, ApiError> {
        let name = match self.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(ApiError::validation("A tour must have a name")),
        };
        if name.chars().count() < 10 {
            return Err(ApiError::validation(
                "A tour name must have more or equal then 10 characters",
            ));
        }
        if name.chars().count() > 40 {
            return Err(ApiError::validation(
                "A tour name must have less or equal then 40 characters",
            ));
        }
        let duration = self
            .duration
            .filter(|d| *d > 0)
            .ok_or_else(|| ApiError::validation("A tour must have a duration"))?;
        let max_group_size = self
            .max_group_size
            .filter(|s| *s > 0)
            .ok_or_else(|| ApiError::validation("A tour must have a max group size"))?;
        let difficulty = self
            .difficulty
            .ok_or_else(|| ApiError::validation("A tour must have a difficulty"))?;
        let price = self
            .price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| ApiError::validation("A tour must have a price"))?;
        if let Some(discount) = self.price_discount {
            if discount >= price {
                return Err(ApiError::validation(format!(
                    "Discount price ({}) should be below regular price",
                    discount
                )));
            }
        }
        let summary = self
            .summary
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ApiError::validation("A tour must have a description"))?;
        let image_cover = self
            .image_cover
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::validation("A tour must have a cover image"))?;
        let ratings_average = self.ratings_average.unwrap_or(4.5);
        if ratings_average < 1.0 {
            return Err(ApiError::validation("Rating must be equal or above 1.0"));
        }
        if ratings_average > 5.0 {
            return Err(ApiError::validation("Rating must be equal or below 5.0"));
        }

        let slug = slugify(&name);
        Ok(TourRecord {
            name,
            slug,
            secret: self.secret,
            duration,
            max_group_size,
            difficulty,
            ratings_average,
            ratings_quantity: 0,
            price,
            price_discount: self.price_discount,
            summary,
            description: self.description.map(|d| d.trim().to_string()),
            image_cover,
            images: self.images,
            start_dates: self.start_dates,
            start_location: self.start_location,
            locations: self.locations,
            guide_ids: self.guides,
        })
    }
}

/// Partial update payload; merged over the stored tour before re-running the
/// before-save hook, so every invariant holds on update too.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTour {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub start_location: Option<GeoPoint>,
    pub locations: Option<Vec<GeoPoint>>,
    pub guides: Option<Vec<Uuid>>,
    pub ratings_average: Option<f64>,
    pub secret: Option<bool>,
}

impl UpdateTour {
    pub fn apply(self, existing: &Tour) -> NewTour {
        NewTour {
            name: self.name.or_else(|| Some(existing.name.clone())),
            duration: self.duration.or(Some(existing.duration)),
            max_group_size: self.max_group_size.or(Some(existing.max_group_size)),
            difficulty: self.difficulty.or(Some(existing.difficulty)),
            price: self.price.or(Some(existing.price)),
            price_discount: self.price_discount.or(existing.price_discount),
            summary: self.summary.or_else(|| Some(existing.summary.clone())),
            description: self.description.or_else(|| existing.description.clone()),
            image_cover: self
                .image_cover
                .or_else(|| Some(existing.image_cover.clone())),
            images: self.images.unwrap_or_else(|| existing.images.clone()),
            start_dates: self
                .start_dates
                .unwrap_or_else(|| existing.start_dates.clone()),
            start_location: self
                .start_location
                .or_else(|| existing.start_location.clone()),
            locations: self.locations.unwrap_or_else(|| existing.locations.clone()),
            guides: self.guides.unwrap_or_else(|| existing.guide_ids.clone()),
            ratings_average: self.ratings_average.or(Some(existing.ratings_average)),
            secret: self.secret.unwrap_or(existing.secret),
        }
    }
}

/// Validated write shape, slug already derived.
#[derive(Debug, Clone)]
pub struct TourRecord {
    pub name: String,
    pub slug: String,
    pub secret: bool,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i64,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub start_location: Option<GeoPoint>,
    pub locations: Vec<GeoPoint>,
    pub guide_ids: Vec<Uuid>,
}

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TourFilter {
    pub difficulty: Option<Difficulty>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TourFilter {
    /// Whitelisted sort column plus descending flag. Unknown keys fall back
    /// to newest-first.
    pub fn order(&self) -> (&'static str, bool) {
        let raw = self.sort.as_deref().unwrap_or("-created_at");
        let (key, descending) = match raw.strip_prefix('-') {
            Some(key) => (key, true),
            None => (raw, false),
        };
        match key {
            "price" => ("price", descending),
            "ratings_average" => ("ratings_average", descending),
            "name" => ("name", descending),
            "created_at" => ("created_at", descending),
            _ => ("created_at", true),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100).min(1000) as i64
    }

    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1) as i64;
        (page - 1) * self.limit()
    }
}

/// One row of the stats aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub num_tours: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> NewTour {
        NewTour {
            name: Some(name.to_string()),
            duration: Some(7),
            max_group_size: Some(15),
            difficulty: Some(Difficulty::Easy),
            price: Some(397.0),
            price_discount: None,
            summary: Some("A relaxing walk in the woods".to_string()),
            description: None,
            image_cover: Some("tour-1-cover.jpg".to_string()),
            images: vec![],
            start_dates: vec![],
            start_location: None,
            locations: vec![],
            guides: vec![],
            ratings_average: None,
            secret: false,
        }
    }

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
        assert_eq!(slugify("  The   Sea    Explorer "), "the-sea-explorer");
        assert_eq!(slugify("Tour #3 (2026)!"), "tour-3-2026");
    }

    #[test]
    fn valid_draft_derives_slug() {
        let record = draft("The Forest Hiker").validate().unwrap();
        assert_eq!(record.slug, "the-forest-hiker");
        assert_eq!(record.ratings_average, 4.5);
        assert_eq!(record.ratings_quantity, 0);
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(draft("Too short").validate().is_err());
        let long = "x".repeat(41);
        assert!(draft(&long).validate().is_err());
    }

    #[test]
    fn discount_must_be_below_price() {
        let mut d = draft("The Forest Hiker");
        d.price_discount = Some(397.0);
        assert!(d.validate().is_err());
        let mut d = draft("The Forest Hiker");
        d.price_discount = Some(500.0);
        assert!(d.validate().is_err());
        let mut d = draft("The Forest Hiker");
        d.price_discount = Some(100.0);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn update_merge_keeps_unchanged_fields() {
        let record = draft("The Forest Hiker").validate().unwrap();
        let tour = Tour {
            id: Uuid::new_v4(),
            name: record.name.clone(),
            slug: record.slug.clone(),
            secret: record.secret,
            duration: record.duration,
            max_group_size: record.max_group_size,
            difficulty: record.difficulty,
            ratings_average: record.ratings_average,
            ratings_quantity: record.ratings_quantity,
            price: record.price,
            price_discount: record.price_discount,
            summary: record.summary.clone(),
            description: record.description.clone(),
            image_cover: record.image_cover.clone(),
            images: record.images.clone(),
            start_dates: record.start_dates.clone(),
            start_location: record.start_location.clone(),
            locations: record.locations.clone(),
            guide_ids: record.guide_ids.clone(),
            created_at: chrono::Utc::now(),
        };
        let update = UpdateTour {
            price: Some(450.0),
            ..Default::default()
        };
        let merged = update.apply(&tour).validate().unwrap();
        assert_eq!(merged.price, 450.0);
        assert_eq!(merged.name, "The Forest Hiker");
        // Re-deriving the slug from an unchanged name leaves it unchanged.
        assert_eq!(merged.slug, tour.slug);
    }

    #[test]
    fn sort_keys_are_whitelisted() {
        let filter = TourFilter {
            sort: Some("-price".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.order(), ("price", true));
        let filter = TourFilter {
            sort: Some("password_hash".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.order(), ("created_at", true));
    }
}
