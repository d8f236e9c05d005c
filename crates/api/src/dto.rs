//! Request bodies accepted by the HTTP API.
//!
//! Responses are the `db::models` row structs serialized as-is.  Requests
//! are decoded here, checked with [`Validate`], and converted into the
//! insert/patch shapes the repository functions take.

use serde::{Deserialize, Deserializer};

use db::models::{
    FieldPatch, GroupPatch, JsonMap, NewField, NewGroup, NewLabUpload, NewSamplingPlan,
    NewSamplingPoint, NewUser,
};

use crate::error::FieldError;

/// Smallest grid cell a sampling plan may use, in acres.
pub const MIN_GRID_SIZE_ACRES: f64 = 0.1;

/// Field-level constraint checks run after decoding and before persistence.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Must be paired with `#[serde(default)]`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_numbering_method() -> String {
    "snake".to_string()
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub hashed_password: String,
    #[serde(default)]
    pub verified: bool,
}

impl From<UserCreate> for NewUser {
    fn from(dto: UserCreate) -> Self {
        Self {
            email: dto.email,
            hashed_password: dto.hashed_password,
            verified: dto.verified,
        }
    }
}

// ---------------------------------------------------------------------------
// groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GroupCreate {
    pub user_id: i64,
    pub name: String,
}

impl From<GroupCreate> for NewGroup {
    fn from(dto: GroupCreate) -> Self {
        Self { user_id: dto.user_id, name: dto.name }
    }
}

/// Rename a group.  `name` is required and may not be null.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupUpdate {
    pub name: String,
}

impl From<GroupUpdate> for GroupPatch {
    fn from(dto: GroupUpdate) -> Self {
        Self { name: Some(dto.name) }
    }
}

// ---------------------------------------------------------------------------
// fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FieldCreate {
    pub user_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
    pub field_name: String,
    #[serde(default)]
    pub geometry_wkt: Option<String>,
    #[serde(default)]
    pub source_file_name: Option<String>,
    #[serde(default, alias = "attributes")]
    pub attributes_json: Option<JsonMap>,
}

impl From<FieldCreate> for NewField {
    fn from(dto: FieldCreate) -> Self {
        Self {
            user_id: dto.user_id,
            group_id: dto.group_id,
            field_name: dto.field_name,
            geometry_wkt: dto.geometry_wkt,
            source_file_name: dto.source_file_name,
            attributes_json: dto.attributes_json,
        }
    }
}

/// Partial field update.  Absent keys are left alone; an explicit `null`
/// clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub field_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub geometry_wkt: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub source_file_name: Option<Option<String>>,
    #[serde(default, alias = "attributes", deserialize_with = "double_option")]
    pub attributes_json: Option<Option<JsonMap>>,
}

impl Validate for FieldUpdate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if matches!(self.field_name, Some(None)) {
            return Err(vec![FieldError::new("field_name", "may not be null")]);
        }
        Ok(())
    }
}

impl From<FieldUpdate> for FieldPatch {
    fn from(dto: FieldUpdate) -> Self {
        Self {
            group_id: dto.group_id,
            field_name: dto.field_name.flatten(),
            geometry_wkt: dto.geometry_wkt,
            source_file_name: dto.source_file_name,
            attributes_json: dto.attributes_json,
        }
    }
}

// ---------------------------------------------------------------------------
// sampling plans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingPlanCreate {
    pub name: String,
    pub grid_size_acres: f64,
    #[serde(default)]
    pub grid_offset_x: f64,
    #[serde(default)]
    pub grid_offset_y: f64,
    #[serde(default = "default_numbering_method")]
    pub numbering_method: String,
}

impl Validate for SamplingPlanCreate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.grid_size_acres.is_nan() || self.grid_size_acres < MIN_GRID_SIZE_ACRES {
            return Err(vec![FieldError::new(
                "grid_size_acres",
                format!("must be greater than or equal to {MIN_GRID_SIZE_ACRES}"),
            )]);
        }
        Ok(())
    }
}

impl From<SamplingPlanCreate> for NewSamplingPlan {
    fn from(dto: SamplingPlanCreate) -> Self {
        Self {
            name: dto.name,
            grid_size_acres: dto.grid_size_acres,
            grid_offset_x: dto.grid_offset_x,
            grid_offset_y: dto.grid_offset_y,
            numbering_method: dto.numbering_method,
        }
    }
}

// ---------------------------------------------------------------------------
// sampling points
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingPointCreate {
    pub point_index: i64,
    pub geometry_wkt: String,
    #[serde(default, alias = "properties")]
    pub properties_json: Option<JsonMap>,
}

impl Validate for SamplingPointCreate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        if self.point_index < 1 {
            return Err(vec![FieldError::new("point_index", "must be greater than or equal to 1")]);
        }
        Ok(())
    }
}

/// A batch is valid only when every point is; errors are prefixed with the
/// point's position in the batch.
impl Validate for Vec<SamplingPointCreate> {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = self
            .iter()
            .enumerate()
            .filter_map(|(i, point)| point.validate().err().map(|errs| (i, errs)))
            .flat_map(|(i, errs)| {
                errs.into_iter()
                    .map(move |e| FieldError::new(format!("[{i}].{}", e.field), e.message))
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<SamplingPointCreate> for NewSamplingPoint {
    fn from(dto: SamplingPointCreate) -> Self {
        Self {
            point_index: dto.point_index,
            geometry_wkt: dto.geometry_wkt,
            properties_json: dto.properties_json,
        }
    }
}

// ---------------------------------------------------------------------------
// lab uploads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LabUploadCreate {
    pub original_filename: String,
    #[serde(default, alias = "mapping")]
    pub mapping_json: Option<JsonMap>,
}

impl From<LabUploadCreate> for NewLabUpload {
    fn from(dto: LabUploadCreate) -> Self {
        Self {
            original_filename: dto.original_filename,
            mapping_json: dto.mapping_json,
        }
    }
}
