//! Named interceptors the repositories run around store calls: pre-save,
//! pre-find and pre-aggregate hooks kept as plain functions so the ordering
//! is visible at the call site instead of hidden in ORM lifecycle magic.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{GuideSummary, NewTour, Tour, TourRecord, TourView, User};
use crate::store::{QueryScope, StoreError, UserStore};

/// Before-persist: validate the draft and derive the slug from the name.
/// Runs for creates and for the merged draft of updates, so the slug is
/// re-derived on every save.
pub fn tour_before_save(draft: NewTour) -> Result<TourRecord, ApiError> {
    draft.validate()
}

/// Before-find: every default read of tours goes through this scope, which
/// hides secret tours. There is deliberately no public way around it.
pub fn tour_find_scope() -> QueryScope {
    QueryScope {
        include_secret: false,
    }
}

/// Before-aggregate: the stats pipeline gets the same exclusion injected at
/// its head.
pub fn tour_aggregate_scope() -> QueryScope {
    QueryScope {
        include_secret: false,
    }
}

/// After-find: resolve guide weak references into embedded summaries.
/// Dangling ids are dropped silently; a weak reference carries no ownership.
pub async fn resolve_guides(
    users: &dyn UserStore,
    tours: Vec<Tour>,
) -> Result<Vec<TourView>, StoreError> {
    let mut ids: Vec<Uuid> = tours.iter().flat_map(|t| t.guide_ids.clone()).collect();
    ids.sort_unstable();
    ids.dedup();

    let guides: HashMap<Uuid, User> = users
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(tours
        .into_iter()
        .map(|tour| {
            let summaries = tour
                .guide_ids
                .iter()
                .filter_map(|id| guides.get(id).map(GuideSummary::from))
                .collect();
            TourView::new(tour, summaries)
        })
        .collect())
}
