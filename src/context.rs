use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::repository::{ReviewRepository, TourRepository, UserRepository};
use crate::store::postgres::{PgReviewStore, PgTourStore, PgUserStore};
use crate::store::{ReviewStore, TourStore, UserStore};

/// Shared application state handed to every handler and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub tours: TourRepository,
    pub users: UserRepository,
    pub reviews: ReviewRepository,
}

/// Store trait objects the repositories are built from. Production uses
/// Postgres; tests plug in an in-memory implementation.
pub struct Stores {
    pub tours: Arc<dyn TourStore>,
    pub users: Arc<dyn UserStore>,
    pub reviews: Arc<dyn ReviewStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tours: Arc::new(PgTourStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
            reviews: Arc::new(PgReviewStore::new(pool)),
        }
    }
}

impl ApiContext {
    pub fn new(config: Arc<AppConfig>, stores: Stores) -> Self {
        let tours = TourRepository::new(stores.tours, stores.users.clone());
        let users = UserRepository::new(stores.users);
        let reviews = ReviewRepository::new(stores.reviews, tours.clone());
        Self {
            config,
            tours,
            users,
            reviews,
        }
    }
}
