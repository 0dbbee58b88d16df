#![allow(dead_code)]

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use trailhead::config::{AppConfig, DatabaseConfig, Environment, JwtConfig};
use trailhead::context::{ApiContext, Stores};
use trailhead::error::init_error_rendering;
use trailhead::models::{
    Difficulty, DifficultyStats, Review, ReviewRecord, Role, Tour, TourFilter, TourRecord, User,
    UserChanges, UserRecord,
};
use trailhead::store::{QueryScope, ReviewStore, StoreError, TourStore, UserStore};
use trailhead::{auth, routes};

// ---------------------------------------------------------------------------
// In-memory stores

#[derive(Default)]
pub struct MemUserStore {
    rows: Mutex<Vec<(User, String)>>,
}

impl MemUserStore {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn remove(&self, id: Uuid) {
        self.rows.lock().unwrap().retain(|(u, _)| u.id != id);
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn insert(&self, record: UserRecord) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|(u, _)| u.email == record.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: record.name,
            email: record.email,
            role: record.role,
            created_at: Utc::now(),
        };
        rows.push((user.clone(), record.password_hash));
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u.email == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| ids.contains(&u.id))
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(email) = &changes.email {
            if rows.iter().any(|(u, _)| u.email == *email && u.id != id) {
                return Err(StoreError::Duplicate("email"));
            }
        }
        for (user, _) in rows.iter_mut() {
            if user.id == id {
                if let Some(name) = changes.name {
                    user.name = name;
                }
                if let Some(email) = changes.email {
                    user.email = email;
                }
                if let Some(role) = changes.role {
                    user.role = role;
                }
                return Ok(Some(user.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(u, _)| u.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemTourStore {
    rows: Mutex<Vec<Tour>>,
}

impl MemTourStore {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

fn materialize(record: TourRecord, id: Uuid, created_at: chrono::DateTime<Utc>) -> Tour {
    Tour {
        id,
        name: record.name,
        slug: record.slug,
        secret: record.secret,
        duration: record.duration,
        max_group_size: record.max_group_size,
        difficulty: record.difficulty,
        ratings_average: record.ratings_average,
        ratings_quantity: record.ratings_quantity,
        price: record.price,
        price_discount: record.price_discount,
        summary: record.summary,
        description: record.description,
        image_cover: record.image_cover,
        images: record.images,
        start_dates: record.start_dates,
        start_location: record.start_location,
        locations: record.locations,
        guide_ids: record.guide_ids,
        created_at,
    }
}

#[async_trait]
impl TourStore for MemTourStore {
    async fn insert(&self, record: TourRecord) -> Result<Tour, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|t| t.name == record.name) {
            return Err(StoreError::Duplicate("name"));
        }
        let tour = materialize(record, Uuid::new_v4(), Utc::now());
        rows.push(tour.clone());
        Ok(tour)
    }

    async fn update(&self, id: Uuid, record: TourRecord) -> Result<Option<Tour>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|t| t.name == record.name && t.id != id) {
            return Err(StoreError::Duplicate("name"));
        }
        for tour in rows.iter_mut() {
            if tour.id == id {
                *tour = materialize(record, id, tour.created_at);
                return Ok(Some(tour.clone()));
            }
        }
        Ok(None)
    }

    async fn find_by_id(&self, id: Uuid, scope: QueryScope) -> Result<Option<Tour>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && (scope.include_secret || !t.secret))
            .cloned())
    }

    async fn list(&self, filter: &TourFilter, scope: QueryScope) -> Result<Vec<Tour>, StoreError> {
        let mut tours: Vec<Tour> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| scope.include_secret || !t.secret)
            .filter(|t| filter.difficulty.map_or(true, |d| t.difficulty == d))
            .cloned()
            .collect();

        let (column, descending) = filter.order();
        tours.sort_by(|a, b| {
            let ord = match column {
                "price" => a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal),
                "ratings_average" => a
                    .ratings_average
                    .partial_cmp(&b.ratings_average)
                    .unwrap_or(Ordering::Equal),
                "name" => a.name.cmp(&b.name),
                _ => a.created_at.cmp(&b.created_at),
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        Ok(tours
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() < before)
    }

    async fn stats_by_difficulty(
        &self,
        scope: QueryScope,
    ) -> Result<Vec<DifficultyStats>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut stats = Vec::new();
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Difficult] {
            let group: Vec<&Tour> = rows
                .iter()
                .filter(|t| t.difficulty == difficulty)
                .filter(|t| scope.include_secret || !t.secret)
                .collect();
            if group.is_empty() {
                continue;
            }
            let n = group.len() as f64;
            stats.push(DifficultyStats {
                difficulty,
                num_tours: group.len() as i64,
                avg_rating: group.iter().map(|t| t.ratings_average).sum::<f64>() / n,
                avg_price: group.iter().map(|t| t.price).sum::<f64>() / n,
                min_price: group.iter().map(|t| t.price).fold(f64::INFINITY, f64::min),
                max_price: group
                    .iter()
                    .map(|t| t.price)
                    .fold(f64::NEG_INFINITY, f64::max),
            });
        }
        Ok(stats)
    }
}

#[derive(Default)]
pub struct MemReviewStore {
    rows: Mutex<Vec<Review>>,
}

impl MemReviewStore {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl ReviewStore for MemReviewStore {
    async fn insert(&self, record: ReviewRecord) -> Result<Review, StoreError> {
        let review = Review {
            id: Uuid::new_v4(),
            review: record.review,
            rating: record.rating,
            tour_id: record.tour_id,
            user_id: record.user_id,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(review.clone());
        Ok(review)
    }

    async fn list(&self, tour_id: Option<Uuid>) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| tour_id.map_or(true, |id| r.tour_id == id))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Test app

pub const TEST_SECRET: &str = "trailhead-test-secret";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemUserStore>,
    pub tours: Arc<MemTourStore>,
    pub reviews: Arc<MemReviewStore>,
    jwt: JwtConfig,
}

pub fn test_app() -> TestApp {
    let config = AppConfig {
        environment: Environment::Production,
        port: 0,
        database_url: String::new(),
        database: DatabaseConfig { max_connections: 1 },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiry_hours: 1,
        },
    };
    // First caller wins; every test binary uses production rendering.
    init_error_rendering(config.environment);

    let users = Arc::new(MemUserStore::default());
    let tours = Arc::new(MemTourStore::default());
    let reviews = Arc::new(MemReviewStore::default());

    let stores = Stores {
        tours: tours.clone(),
        users: users.clone(),
        reviews: reviews.clone(),
    };
    let jwt = config.jwt.clone();
    let ctx = ApiContext::new(Arc::new(config), stores);

    TestApp {
        router: routes::app(ctx),
        users,
        tours,
        reviews,
        jwt,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request("GET", path, None, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, None, Some(body)).await
    }

    /// Insert a user directly into the store, bypassing the signup route.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str, role: Role) -> User {
        let password_hash = trailhead::handlers::auth::hash_password(password.to_string())
            .await
            .unwrap();
        self.users
            .insert(UserRecord {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                role,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        auth::sign_token(&self.jwt, user.id).unwrap()
    }
}

/// A minimal valid tour payload.
pub fn tour_payload(name: &str) -> Value {
    json!({
        "name": name,
        "duration": 7,
        "max_group_size": 15,
        "difficulty": "easy",
        "price": 397.0,
        "summary": "Breathtaking hike through the Canadian Banff National Park",
        "image_cover": "tour-1-cover.jpg",
    })
}

pub fn signup_payload(name: &str, email: &str, password: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": password,
        "confirm_password": password,
    })
}
