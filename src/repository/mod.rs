//! Thin per-entity data-access layer. Each repository wraps a store trait
//! object and runs the named hooks from [`hooks`] around the raw operations,
//! so every caller gets the same derived fields and visibility scoping.

pub mod hooks;

use std::sync::Arc;

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    DifficultyStats, NewReview, NewTour, Review, TourFilter, TourView, UpdateTour, User,
    UserChanges, UserRecord,
};
use crate::store::{ReviewStore, TourStore, UserStore};

const NO_TOUR: &str = "No tour found with that ID";
const NO_USER: &str = "No user found with that ID";
const NO_REVIEW: &str = "No review found with that ID";

#[derive(Clone)]
pub struct TourRepository {
    store: Arc<dyn TourStore>,
    users: Arc<dyn UserStore>,
}

impl TourRepository {
    pub fn new(store: Arc<dyn TourStore>, users: Arc<dyn UserStore>) -> Self {
        Self { store, users }
    }

    pub async fn create(&self, draft: NewTour) -> Result<TourView, ApiError> {
        let record = hooks::tour_before_save(draft)?;
        let tour = self.store.insert(record).await?;
        self.view_one(tour).await
    }

    async fn view_one(&self, tour: crate::models::Tour) -> Result<TourView, ApiError> {
        hooks::resolve_guides(&*self.users, vec![tour])
            .await?
            .pop()
            .ok_or_else(|| ApiError::internal(anyhow::anyhow!("guide resolution dropped a tour")))
    }

    pub async fn update(&self, id: Uuid, changes: UpdateTour) -> Result<TourView, ApiError> {
        // Scoped read first: a secret tour is not updatable through the API.
        let existing = self
            .store
            .find_by_id(id, hooks::tour_find_scope())
            .await?
            .ok_or_else(|| ApiError::not_found(NO_TOUR))?;

        let mut record = hooks::tour_before_save(changes.apply(&existing))?;
        record.ratings_quantity = existing.ratings_quantity;

        let tour = self
            .store
            .update(id, record)
            .await?
            .ok_or_else(|| ApiError::not_found(NO_TOUR))?;
        self.view_one(tour).await
    }

    pub async fn get(&self, id: Uuid) -> Result<TourView, ApiError> {
        let tour = self
            .store
            .find_by_id(id, hooks::tour_find_scope())
            .await?
            .ok_or_else(|| ApiError::not_found(NO_TOUR))?;
        self.view_one(tour).await
    }

    pub async fn list(&self, filter: &TourFilter) -> Result<Vec<TourView>, ApiError> {
        let tours = self.store.list(filter, hooks::tour_find_scope()).await?;
        Ok(hooks::resolve_guides(&*self.users, tours).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        // Scoped read first, same as update: a secret tour is not deletable
        // through the API either.
        if self
            .store
            .find_by_id(id, hooks::tour_find_scope())
            .await?
            .is_none()
        {
            return Err(ApiError::not_found(NO_TOUR));
        }
        if !self.store.delete(id).await? {
            return Err(ApiError::not_found(NO_TOUR));
        }
        Ok(())
    }

    pub async fn stats(&self) -> Result<Vec<DifficultyStats>, ApiError> {
        Ok(self
            .store
            .stats_by_difficulty(hooks::tour_aggregate_scope())
            .await?)
    }

    /// Scoped existence check used before attaching child records.
    pub async fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self
            .store
            .find_by_id(id, hooks::tour_find_scope())
            .await?
            .is_some())
    }
}

#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: UserRecord) -> Result<User, ApiError> {
        Ok(self.store.insert(record).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NO_USER))
    }

    pub async fn credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, ApiError> {
        Ok(self.store.find_by_email_with_password(email).await?)
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, ApiError> {
        self.store
            .update(id, changes)
            .await?
            .ok_or_else(|| ApiError::not_found(NO_USER))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(ApiError::not_found(NO_USER));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ReviewRepository {
    store: Arc<dyn ReviewStore>,
    tours: TourRepository,
}

impl ReviewRepository {
    pub fn new(store: Arc<dyn ReviewStore>, tours: TourRepository) -> Self {
        Self { store, tours }
    }

    pub async fn create(
        &self,
        tour_id: Uuid,
        user_id: Uuid,
        payload: NewReview,
    ) -> Result<Review, ApiError> {
        let record = payload.validate(tour_id, user_id)?;
        // The scoped lookup means secret tours cannot collect reviews either.
        if !self.tours.exists(tour_id).await? {
            return Err(ApiError::not_found(NO_TOUR));
        }
        Ok(self.store.insert(record).await?)
    }

    pub async fn list_for_tour(&self, tour_id: Uuid) -> Result<Vec<Review>, ApiError> {
        Ok(self.store.list(Some(tour_id)).await?)
    }

    pub async fn list(&self) -> Result<Vec<Review>, ApiError> {
        Ok(self.store.list(None).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(ApiError::not_found(NO_REVIEW));
        }
        Ok(())
    }
}
