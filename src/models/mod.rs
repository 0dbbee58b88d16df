pub mod review;
pub mod tour;
pub mod user;

pub use review::{NewReview, Review, ReviewRecord};
pub use tour::{
    Difficulty, DifficultyStats, GeoPoint, GuideSummary, NewTour, Tour, TourFilter, TourRecord,
    TourView, UpdateTour,
};
pub use user::{NewUser, Role, UpdateUser, User, UserChanges, UserRecord};
