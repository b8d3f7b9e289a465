use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use shared::{
    domain::{EntityId, EntityKind, LocationId, MediaCategory, Weekday},
    protocol::Geolocation,
};

use crate::{
    error::FormError,
    media::MediaSet,
    timings::WeeklyTimings,
    venue::{VenueAddress, VenueType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit,
}

/// The full in-memory representation of one record under edit.
#[derive(Debug, Clone, PartialEq)]
pub struct FormModel {
    pub id: Option<EntityId>,
    pub mode: FormMode,
    pub entity: EntityDraft,
    pub media: BTreeMap<MediaCategory, MediaSet>,
}

impl FormModel {
    pub fn new(kind: EntityKind) -> Self {
        let entity = match kind {
            EntityKind::Studio => EntityDraft::Studio(StudioDraft::default()),
            EntityKind::Workshop => EntityDraft::Workshop(WorkshopDraft::default()),
        };
        Self {
            id: None,
            mode: FormMode::New,
            entity,
            media: empty_media(kind),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn studio(&self) -> Option<&StudioDraft> {
        match &self.entity {
            EntityDraft::Studio(studio) => Some(studio),
            EntityDraft::Workshop(_) => None,
        }
    }

    pub fn workshop(&self) -> Option<&WorkshopDraft> {
        match &self.entity {
            EntityDraft::Workshop(workshop) => Some(workshop),
            EntityDraft::Studio(_) => None,
        }
    }

    pub fn media_set(&self, category: MediaCategory) -> Option<&MediaSet> {
        self.media.get(&category)
    }

    /// Records the id returned by the create call. An id is assigned once.
    pub fn assign_id(&mut self, id: EntityId) -> Result<(), FormError> {
        if self.id.is_some() {
            return Err(FormError::IdAlreadyAssigned);
        }
        self.id = Some(id);
        Ok(())
    }

    /// The empty model of the same kind, used after cancel or submit.
    pub fn initial(&self) -> Self {
        Self::new(self.kind())
    }
}

pub(crate) fn empty_media(kind: EntityKind) -> BTreeMap<MediaCategory, MediaSet> {
    kind.media_categories()
        .iter()
        .map(|category| (*category, MediaSet::new(*category)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityDraft {
    Studio(StudioDraft),
    Workshop(WorkshopDraft),
}

impl EntityDraft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Studio(_) => EntityKind::Studio,
            Self::Workshop(_) => EntityKind::Workshop,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudioDraft {
    pub studio_name: String,
    pub founder_name: String,
    pub about_studio: String,
    pub about_founder: String,
    pub mobile_number: String,
    pub mail_address: String,
    pub whatsapp_number: String,
    pub creator_email: String,
    pub dance_styles: Vec<String>,
    pub amenities: Vec<String>,
    pub maximum_occupancy: String,
    pub number_of_halls: String,
    pub building_name: String,
    pub landmark: String,
    pub street: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
    pub map_address: String,
    pub geolocation: Option<Geolocation>,
    pub gst_number: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub status: String,
    pub schedules: Vec<ClassSchedule>,
    pub timings: WeeklyTimings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioField {
    StudioName,
    FounderName,
    AboutStudio,
    AboutFounder,
    MobileNumber,
    MailAddress,
    WhatsappNumber,
    CreatorEmail,
    MaximumOccupancy,
    NumberOfHalls,
    BuildingName,
    Landmark,
    Street,
    Pincode,
    City,
    State,
    MapAddress,
    GstNumber,
    Instagram,
    Facebook,
    Youtube,
    Status,
}

impl StudioDraft {
    pub fn field_mut(&mut self, field: StudioField) -> &mut String {
        match field {
            StudioField::StudioName => &mut self.studio_name,
            StudioField::FounderName => &mut self.founder_name,
            StudioField::AboutStudio => &mut self.about_studio,
            StudioField::AboutFounder => &mut self.about_founder,
            StudioField::MobileNumber => &mut self.mobile_number,
            StudioField::MailAddress => &mut self.mail_address,
            StudioField::WhatsappNumber => &mut self.whatsapp_number,
            StudioField::CreatorEmail => &mut self.creator_email,
            StudioField::MaximumOccupancy => &mut self.maximum_occupancy,
            StudioField::NumberOfHalls => &mut self.number_of_halls,
            StudioField::BuildingName => &mut self.building_name,
            StudioField::Landmark => &mut self.landmark,
            StudioField::Street => &mut self.street,
            StudioField::Pincode => &mut self.pincode,
            StudioField::City => &mut self.city,
            StudioField::State => &mut self.state,
            StudioField::MapAddress => &mut self.map_address,
            StudioField::GstNumber => &mut self.gst_number,
            StudioField::Instagram => &mut self.instagram,
            StudioField::Facebook => &mut self.facebook,
            StudioField::Youtube => &mut self.youtube,
            StudioField::Status => &mut self.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassSchedule {
    /// Backend key of a hydrated row; `None` for rows added in this form.
    pub key: Option<String>,
    pub class_name: String,
    pub dance_form: String,
    pub days: Vec<Weekday>,
    /// Days text the row was loaded with. Written back as is until the
    /// row's days are edited.
    pub days_text: Option<String>,
    /// `hh:mm AM - hh:mm PM`
    pub time: String,
    pub fee: String,
    pub level: String,
    pub free_trial: bool,
    pub instructors: Vec<String>,
    pub categories: Vec<String>,
}

impl ClassSchedule {
    pub fn has_days(&self) -> bool {
        !self.days.is_empty()
            || self
                .days_text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaMode {
    #[default]
    Image,
    VideoLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopDraft {
    pub name: String,
    pub description: String,
    pub dance_styles: Vec<String>,
    pub youtube_link: String,
    pub media_mode: MediaMode,
    pub level: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub creator_email: String,
    pub venue_type: VenueType,
    pub location_id: Option<LocationId>,
    pub studio_association: Option<String>,
    pub address: VenueAddress,
    pub variants: Vec<WorkshopVariant>,
}

impl Default for WorkshopDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            dance_styles: Vec::new(),
            youtube_link: String::new(),
            media_mode: MediaMode::default(),
            level: String::new(),
            start_date: None,
            end_date: None,
            creator_email: String::new(),
            venue_type: VenueType::AssociatedLocation,
            location_id: None,
            studio_association: None,
            address: VenueAddress::default(),
            variants: vec![WorkshopVariant::default()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkshopField {
    Name,
    Description,
    YoutubeLink,
    Level,
    CreatorEmail,
    Building,
    Street,
    City,
    State,
    Landmark,
    MapAddress,
}

impl WorkshopField {
    /// Address fields, read-only while the venue is an associated location.
    pub fn is_address(self) -> bool {
        matches!(
            self,
            Self::Building
                | Self::Street
                | Self::City
                | Self::State
                | Self::Landmark
                | Self::MapAddress
        )
    }
}

impl WorkshopDraft {
    pub fn field_mut(&mut self, field: WorkshopField) -> &mut String {
        match field {
            WorkshopField::Name => &mut self.name,
            WorkshopField::Description => &mut self.description,
            WorkshopField::YoutubeLink => &mut self.youtube_link,
            WorkshopField::Level => &mut self.level,
            WorkshopField::CreatorEmail => &mut self.creator_email,
            WorkshopField::Building => &mut self.address.building,
            WorkshopField::Street => &mut self.address.street,
            WorkshopField::City => &mut self.address.city,
            WorkshopField::State => &mut self.address.state,
            WorkshopField::Landmark => &mut self.address.landmark,
            WorkshopField::MapAddress => &mut self.address.map_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopVariant {
    pub id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub description: String,
    pub subvariants: Vec<Subvariant>,
}

impl Default for WorkshopVariant {
    fn default() -> Self {
        Self {
            id: None,
            date: None,
            start_time: None,
            end_time: None,
            description: String::new(),
            subvariants: vec![Subvariant::default()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subvariant {
    pub id: Option<String>,
    pub price: String,
    pub capacity: String,
    pub description: String,
}
