//! sqlx-backed store implementations. Queries are runtime-checked so the
//! crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{
    Difficulty, DifficultyStats, GeoPoint, Review, ReviewRecord, Tour, TourFilter, TourRecord,
    User, UserChanges, UserRecord,
};
use crate::store::{QueryScope, ReviewStore, StoreError, TourStore, UserStore};

fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            let field = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("name") => "name",
                _ => "field",
            };
            return StoreError::Duplicate(field);
        }
    }
    StoreError::Database(e)
}

fn decode_error(msg: String) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(msg.into()))
}

// ---------------------------------------------------------------------------
// Users

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(decode_error)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserAuthRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    password_hash: String,
}

const USER_COLUMNS: &str = "id, name, email, role, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, record: UserRecord) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, role, created_at",
        )
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, StoreError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            "SELECT id, name, email, role, created_at, password_hash
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| {
            let hash = r.password_hash.clone();
            let user = User {
                id: r.id,
                name: r.name,
                email: r.email,
                role: r.role.parse().map_err(decode_error)?,
                created_at: r.created_at,
            };
            Ok((user, hash))
        })
        .transpose()
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role)
             WHERE id = $1
             RETURNING id, name, email, role, created_at",
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.map(User::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Tours

#[derive(Clone)]
pub struct PgTourStore {
    pool: PgPool,
}

impl PgTourStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TourRow {
    id: Uuid,
    name: String,
    slug: String,
    secret: bool,
    duration: i32,
    max_group_size: i32,
    difficulty: String,
    ratings_average: f64,
    ratings_quantity: i64,
    price: f64,
    price_discount: Option<f64>,
    summary: String,
    description: Option<String>,
    image_cover: String,
    images: Json<Vec<String>>,
    start_dates: Json<Vec<DateTime<Utc>>>,
    start_location: Option<Json<GeoPoint>>,
    locations: Json<Vec<GeoPoint>>,
    guide_ids: Json<Vec<Uuid>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TourRow> for Tour {
    type Error = StoreError;

    fn try_from(row: TourRow) -> Result<Self, Self::Error> {
        Ok(Tour {
            id: row.id,
            name: row.name,
            slug: row.slug,
            secret: row.secret,
            duration: row.duration,
            max_group_size: row.max_group_size,
            difficulty: row.difficulty.parse().map_err(decode_error)?,
            ratings_average: row.ratings_average,
            ratings_quantity: row.ratings_quantity,
            price: row.price,
            price_discount: row.price_discount,
            summary: row.summary,
            description: row.description,
            image_cover: row.image_cover,
            images: row.images.0,
            start_dates: row.start_dates.0,
            start_location: row.start_location.map(|j| j.0),
            locations: row.locations.0,
            guide_ids: row.guide_ids.0,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TourStore for PgTourStore {
    async fn insert(&self, record: TourRecord) -> Result<Tour, StoreError> {
        let row = sqlx::query_as::<_, TourRow>(
            "INSERT INTO tours (name, slug, secret, duration, max_group_size, difficulty,
                                ratings_average, ratings_quantity, price, price_discount,
                                summary, description, image_cover, images, start_dates,
                                start_location, locations, guide_ids)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                     $11, $12, $13, $14, $15, $16, $17, $18)
             RETURNING *",
        )
        .bind(&record.name)
        .bind(&record.slug)
        .bind(record.secret)
        .bind(record.duration)
        .bind(record.max_group_size)
        .bind(record.difficulty.as_str())
        .bind(record.ratings_average)
        .bind(record.ratings_quantity)
        .bind(record.price)
        .bind(record.price_discount)
        .bind(&record.summary)
        .bind(&record.description)
        .bind(&record.image_cover)
        .bind(Json(&record.images))
        .bind(Json(&record.start_dates))
        .bind(record.start_location.as_ref().map(Json))
        .bind(Json(&record.locations))
        .bind(Json(&record.guide_ids))
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.try_into()
    }

    async fn update(&self, id: Uuid, record: TourRecord) -> Result<Option<Tour>, StoreError> {
        let row = sqlx::query_as::<_, TourRow>(
            "UPDATE tours
             SET name = $2, slug = $3, secret = $4, duration = $5, max_group_size = $6,
                 difficulty = $7, ratings_average = $8, ratings_quantity = $9, price = $10,
                 price_discount = $11, summary = $12, description = $13, image_cover = $14,
                 images = $15, start_dates = $16, start_location = $17, locations = $18,
                 guide_ids = $19
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&record.name)
        .bind(&record.slug)
        .bind(record.secret)
        .bind(record.duration)
        .bind(record.max_group_size)
        .bind(record.difficulty.as_str())
        .bind(record.ratings_average)
        .bind(record.ratings_quantity)
        .bind(record.price)
        .bind(record.price_discount)
        .bind(&record.summary)
        .bind(&record.description)
        .bind(&record.image_cover)
        .bind(Json(&record.images))
        .bind(Json(&record.start_dates))
        .bind(record.start_location.as_ref().map(Json))
        .bind(Json(&record.locations))
        .bind(Json(&record.guide_ids))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.map(Tour::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid, scope: QueryScope) -> Result<Option<Tour>, StoreError> {
        let row = sqlx::query_as::<_, TourRow>(
            "SELECT * FROM tours WHERE id = $1 AND ($2 OR NOT secret)",
        )
        .bind(id)
        .bind(scope.include_secret)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Tour::try_from).transpose()
    }

    async fn list(&self, filter: &TourFilter, scope: QueryScope) -> Result<Vec<Tour>, StoreError> {
        let (column, descending) = filter.order();
        let sql = format!(
            "SELECT * FROM tours
             WHERE ($1::text IS NULL OR difficulty = $1) AND ($2 OR NOT secret)
             ORDER BY {} {}
             LIMIT $3 OFFSET $4",
            column,
            if descending { "DESC" } else { "ASC" },
        );
        let rows = sqlx::query_as::<_, TourRow>(&sql)
            .bind(filter.difficulty.map(|d| d.as_str()))
            .bind(scope.include_secret)
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Tour::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats_by_difficulty(
        &self,
        scope: QueryScope,
    ) -> Result<Vec<DifficultyStats>, StoreError> {
        #[derive(FromRow)]
        struct StatsRow {
            difficulty: String,
            num_tours: i64,
            avg_rating: Option<f64>,
            avg_price: Option<f64>,
            min_price: Option<f64>,
            max_price: Option<f64>,
        }

        let rows = sqlx::query_as::<_, StatsRow>(
            "SELECT difficulty,
                    COUNT(*) AS num_tours,
                    AVG(ratings_average) AS avg_rating,
                    AVG(price) AS avg_price,
                    MIN(price) AS min_price,
                    MAX(price) AS max_price
             FROM tours
             WHERE ($1 OR NOT secret)
             GROUP BY difficulty
             ORDER BY avg_price",
        )
        .bind(scope.include_secret)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(DifficultyStats {
                    difficulty: row.difficulty.parse::<Difficulty>().map_err(decode_error)?,
                    num_tours: row.num_tours,
                    avg_rating: row.avg_rating.unwrap_or(0.0),
                    avg_price: row.avg_price.unwrap_or(0.0),
                    min_price: row.min_price.unwrap_or(0.0),
                    max_price: row.max_price.unwrap_or(0.0),
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reviews

#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: Uuid,
    review: String,
    rating: f64,
    tour_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id,
            review: row.review,
            rating: row.rating,
            tour_id: row.tour_id,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn insert(&self, record: ReviewRecord) -> Result<Review, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO reviews (review, rating, tour_id, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&record.review)
        .bind(record.rating)
        .bind(record.tour_id)
        .bind(record.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn list(&self, tour_id: Option<Uuid>) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews
             WHERE ($1::uuid IS NULL OR tour_id = $1)
             ORDER BY created_at DESC",
        )
        .bind(tour_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
