//! Repository functions — one function per database operation.
//!
//! Every function takes a `&DbPool` and returns a `Result<T, DbError>`.
//! No business logic, no request types — pure SQL.
//!
//! Lookups by primary key return `Ok(None)` for a missing row; only deletes
//! report `DbError::NotFound`.

pub mod users;
pub mod groups;
pub mod fields;
pub mod sampling_plans;
pub mod sampling_points;
pub mod lab_uploads;
