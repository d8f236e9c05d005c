//! Row structs that map 1-to-1 onto database tables, plus the insert and
//! patch shapes the repository functions accept.
//!
//! These are *persistence* models — they carry no validation.  Request
//! decoding and constraint checks live in the `api` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Open-ended JSON object stored as-is (`attributes_json`, `properties_json`,
/// `mapping_json`).  Keys are unique; no schema is enforced.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub hashed_password: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// groups
// ---------------------------------------------------------------------------

/// A persisted group row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GroupRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub user_id: i64,
    pub name: String,
}

/// Partial update for a group.  `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct GroupPatch {
    pub name: Option<String>,
}

impl GroupPatch {
    pub fn apply(self, row: &mut GroupRow) {
        if let Some(name) = self.name {
            row.name = name;
        }
    }
}

// ---------------------------------------------------------------------------
// fields
// ---------------------------------------------------------------------------

/// A persisted field (land parcel) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FieldRow {
    pub id: i64,
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub field_name: String,
    /// Boundary geometry as WKT, stored verbatim.
    pub geometry_wkt: Option<String>,
    pub source_file_name: Option<String>,
    pub attributes_json: Option<Json<JsonMap>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewField {
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub field_name: String,
    pub geometry_wkt: Option<String>,
    pub source_file_name: Option<String>,
    pub attributes_json: Option<JsonMap>,
}

/// Partial update for a field.
///
/// The outer `Option` says whether the column is being changed at all; for
/// nullable columns the inner `Option` is the new value, so `Some(None)`
/// clears it.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub group_id: Option<Option<i64>>,
    pub field_name: Option<String>,
    pub geometry_wkt: Option<Option<String>>,
    pub source_file_name: Option<Option<String>>,
    pub attributes_json: Option<Option<JsonMap>>,
}

impl FieldPatch {
    pub fn apply(self, row: &mut FieldRow) {
        if let Some(group_id) = self.group_id {
            row.group_id = group_id;
        }
        if let Some(field_name) = self.field_name {
            row.field_name = field_name;
        }
        if let Some(geometry_wkt) = self.geometry_wkt {
            row.geometry_wkt = geometry_wkt;
        }
        if let Some(source_file_name) = self.source_file_name {
            row.source_file_name = source_file_name;
        }
        if let Some(attributes) = self.attributes_json {
            row.attributes_json = attributes.map(Json);
        }
    }
}

// ---------------------------------------------------------------------------
// sampling_plans
// ---------------------------------------------------------------------------

/// A persisted sampling plan row.
///
/// `grid_*` and `numbering_method` are stored for downstream grid tooling and
/// are never interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SamplingPlanRow {
    pub id: i64,
    pub field_id: i64,
    pub name: String,
    pub grid_size_acres: f64,
    pub grid_offset_x: f64,
    pub grid_offset_y: f64,
    pub numbering_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSamplingPlan {
    pub name: String,
    pub grid_size_acres: f64,
    pub grid_offset_x: f64,
    pub grid_offset_y: f64,
    pub numbering_method: String,
}

// ---------------------------------------------------------------------------
// sampling_points
// ---------------------------------------------------------------------------

/// A persisted sampling point row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SamplingPointRow {
    pub id: i64,
    pub sampling_plan_id: i64,
    pub point_index: i64,
    pub geometry_wkt: String,
    pub properties_json: Option<Json<JsonMap>>,
}

#[derive(Debug, Clone)]
pub struct NewSamplingPoint {
    pub point_index: i64,
    pub geometry_wkt: String,
    pub properties_json: Option<JsonMap>,
}

// ---------------------------------------------------------------------------
// lab_uploads
// ---------------------------------------------------------------------------

/// Metadata for an externally produced lab results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LabUploadRow {
    pub id: i64,
    pub sampling_plan_id: i64,
    pub original_filename: String,
    /// Column mapping supplied by the client (lab column -> sample attribute).
    pub mapping_json: Option<Json<JsonMap>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLabUpload {
    pub original_filename: String,
    pub mapping_json: Option<JsonMap>,
}
