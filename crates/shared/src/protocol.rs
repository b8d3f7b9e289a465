use std::collections::BTreeMap;

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

use crate::domain::{EntityId, EntityKind, LocationId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlotRecord {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassScheduleRecord {
    pub class_name: String,
    pub dance_forms: String,
    pub days: String,
    pub time: String,
    #[serde(deserialize_with = "string_or_number")]
    pub fee: String,
    pub level: String,
    pub free_trial: bool,
    pub instructors: String,
    pub class_category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudioRecord {
    pub studio_name: String,
    pub founder_name: String,
    pub about_studio: String,
    pub about_founder: String,
    pub mobile_number: String,
    pub mail_address: String,
    pub whatsapp_number: String,
    pub creator_email: String,
    pub dance_styles: String,
    pub add_amenities: String,
    #[serde(deserialize_with = "string_or_number")]
    pub maximum_occupancy: String,
    #[serde(deserialize_with = "string_or_number")]
    pub number_of_halls: String,
    pub building_name: String,
    pub landmark: String,
    pub street: String,
    #[serde(deserialize_with = "string_or_number")]
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub map_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<Geolocation>,
    pub gst_number: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub status: String,
    pub table_data: BTreeMap<String, ClassScheduleRecord>,
    pub timings: BTreeMap<String, Vec<TimeSlotRecord>>,
}

/// A studio as returned by the backend, id included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioDocument {
    #[serde(alias = "studioId", alias = "studio_id")]
    pub id: EntityId,
    #[serde(flatten)]
    pub studio: StudioRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkshopRecord {
    pub name: String,
    pub description: String,
    pub dance_styles: String,
    pub youtube_link: String,
    pub level: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(alias = "creatorEmail")]
    pub creator_email: String,
    pub studio_association: Option<String>,
    pub building: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub landmark: String,
    pub geolocation: String,
    #[serde(alias = "mapAddress")]
    pub map_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubvariantRecord {
    pub subvariant_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub price: String,
    #[serde(deserialize_with = "string_or_number")]
    pub capacity: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantRecord {
    pub variant_id: String,
    pub date: String,
    pub time: String,
    pub description: String,
    pub subvariants: Vec<SubvariantRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkshopPayload {
    pub workshop: WorkshopRecord,
    pub variants: Vec<VariantRecord>,
}

/// A workshop as returned by the creator listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopDocument {
    pub workshop_id: EntityId,
    #[serde(flatten)]
    pub workshop: WorkshopRecord,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
}

/// Body of a primary create/update call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityPayload {
    Studio(StudioRecord),
    Workshop(WorkshopPayload),
}

impl EntityPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Studio(_) => EntityKind::Studio,
            Self::Workshop(_) => EntityKind::Workshop,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntityResponse {
    #[serde(alias = "workshop_id", alias = "studio_id", alias = "studioId")]
    pub id: EntityId,
}

/// An existing studio a workshop can be held at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationSummary {
    pub id: LocationId,
    pub studio_name: String,
    pub building_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub landmark: String,
    pub map_address: String,
    pub geolocation: Option<Geolocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationListResponse {
    #[serde(default)]
    pub data: Vec<LocationSummary>,
}

/// User lookup by email. A missing or empty `data` object means no account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserLookupResponse {
    #[serde(default)]
    pub data: Option<BTreeMap<String, IgnoredAny>>,
}

impl UserLookupResponse {
    pub fn has_user(&self) -> bool {
        self.data.as_ref().is_some_and(|data| !data.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaListResponse {
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadResult {
    pub filename: Option<String>,
    pub url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaUploadResponse {
    #[serde(default)]
    pub results: Vec<UploadResult>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Int(value) => value.to_string(),
        Raw::Float(value) => value.to_string(),
        Raw::Null(()) => String::new(),
    })
}
