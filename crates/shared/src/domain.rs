use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(EntityId);
string_id!(LocationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Studio,
    Workshop,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Studio => "studio",
            Self::Workshop => "workshop",
        }
    }

    /// Media categories attached to records of this kind, in commit order.
    pub fn media_categories(self) -> &'static [MediaCategory] {
        match self {
            Self::Studio => &[
                MediaCategory::StudioPhotos,
                MediaCategory::StudioLogo,
                MediaCategory::StudioAnnouncements,
            ],
            Self::Workshop => &[MediaCategory::WorkshopIcon],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Canonical timings-map key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Short label used inside class schedule `days` strings.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tues",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thurs",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.key() == key)
    }

    pub fn from_short_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.short_label() == label || day.key() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    StudioPhotos,
    StudioLogo,
    StudioAnnouncements,
    WorkshopIcon,
}

impl MediaCategory {
    pub fn name(self) -> &'static str {
        match self {
            Self::StudioPhotos => "photos",
            Self::StudioLogo => "logo",
            Self::StudioAnnouncements => "announcements",
            Self::WorkshopIcon => "icon",
        }
    }

    /// Backend media collection backing this category.
    pub fn collection(self) -> &'static str {
        match self {
            Self::StudioPhotos => "studioImage",
            Self::StudioLogo => "studioIcon",
            Self::StudioAnnouncements => "studioAnnouncements",
            Self::WorkshopIcon => "workshopIcon",
        }
    }

    pub fn owner_kind(self) -> EntityKind {
        match self {
            Self::StudioPhotos | Self::StudioLogo | Self::StudioAnnouncements => {
                EntityKind::Studio
            }
            Self::WorkshopIcon => EntityKind::Workshop,
        }
    }

    pub fn from_name(kind: EntityKind, name: &str) -> Option<Self> {
        kind.media_categories()
            .iter()
            .copied()
            .find(|category| category.name() == name)
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
