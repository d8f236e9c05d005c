//! Route handlers, one module per resource.
//!
//! Handlers decode and validate the request, resolve the parent named in the
//! path, and hand off to `db::repository`.

pub mod health;
pub mod users;
pub mod groups;
pub mod fields;
pub mod sampling_plans;
pub mod sampling_points;
pub mod lab_uploads;

use serde::Deserialize;

pub use crate::AppState;

/// `?user_id=` filter shared by the group and field listings.
#[derive(Debug, Default, Deserialize)]
pub struct OwnerFilter {
    pub user_id: Option<i64>,
}
