//! Named transitions over an immutable [`FormModel`] snapshot.

use chrono::{NaiveDate, NaiveTime};
use shared::{
    domain::{EntityKind, MediaCategory, Weekday},
    protocol::{Geolocation, LocationSummary},
};
use tracing::debug;

use crate::{
    error::{FormError, MediaError},
    gateway::ResolvedAddress,
    media::{LocalFile, LocalId, MediaSet},
    model::{
        ClassSchedule, EntityDraft, FormModel, MediaMode, StudioDraft, StudioField, Subvariant,
        WorkshopDraft, WorkshopField, WorkshopVariant,
    },
    venue::{derive_venue, format_geolocation, VenueAddress, VenueType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDetails {
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubvariantDetails {
    pub price: String,
    pub capacity: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub enum FormAction {
    SetStudioField {
        field: StudioField,
        value: String,
    },
    SetWorkshopField {
        field: WorkshopField,
        value: String,
    },
    SetDanceStyles(Vec<String>),
    SetAmenities(Vec<String>),
    SetStartDate(Option<NaiveDate>),
    SetEndDate(Option<NaiveDate>),
    SetMediaMode(MediaMode),
    AddSchedule,
    /// Replaces a schedule row; the row keeps its backend key.
    UpdateSchedule {
        index: usize,
        schedule: ClassSchedule,
    },
    RemoveSchedule(usize),
    ToggleScheduleDay {
        index: usize,
        day: Weekday,
    },
    ToggleDayClosed(Weekday),
    AddSlot(Weekday),
    RemoveSlot {
        day: Weekday,
        index: usize,
    },
    SetSlot {
        day: Weekday,
        index: usize,
        open: String,
        close: String,
    },
    AddVariant,
    RemoveVariant(usize),
    UpdateVariant {
        index: usize,
        details: VariantDetails,
    },
    AddSubvariant {
        variant: usize,
    },
    RemoveSubvariant {
        variant: usize,
        index: usize,
    },
    UpdateSubvariant {
        variant: usize,
        index: usize,
        details: SubvariantDetails,
    },
    SelectVenueType(VenueType),
    /// Copies the location's address into the workshop and switches the
    /// venue to that location.
    SelectLocation(LocationSummary),
    ClearLocation,
    ApplyResolvedAddress(ResolvedAddress),
    AddMedia {
        category: MediaCategory,
        files: Vec<LocalFile>,
    },
    RemoveExistingMedia {
        category: MediaCategory,
        url: String,
    },
    RemoveLocalMedia {
        category: MediaCategory,
        id: LocalId,
    },
    Reset,
}

/// Applies `action` to a copy of `model`. On error the caller keeps `model`.
pub fn reduce(model: &FormModel, action: FormAction) -> Result<FormModel, FormError> {
    if matches!(action, FormAction::Reset) {
        return Ok(model.initial());
    }
    let mut next = model.clone();
    match apply(&mut next, action) {
        Ok(()) => Ok(next),
        Err(err) => {
            debug!(kind = %model.kind(), "form action rejected: {err}");
            Err(err)
        }
    }
}

fn apply(model: &mut FormModel, action: FormAction) -> Result<(), FormError> {
    match action {
        FormAction::SetStudioField { field, value } => {
            *studio_mut(model)?.field_mut(field) = value;
        }
        FormAction::SetWorkshopField { field, value } => {
            let workshop = workshop_mut(model)?;
            if field.is_address() && workshop.venue_type == VenueType::AssociatedLocation {
                return Err(FormError::ReadOnlyField {
                    field: address_field_name(field),
                });
            }
            *workshop.field_mut(field) = value;
        }
        FormAction::SetDanceStyles(styles) => match &mut model.entity {
            EntityDraft::Studio(studio) => studio.dance_styles = styles,
            EntityDraft::Workshop(workshop) => workshop.dance_styles = styles,
        },
        FormAction::SetAmenities(amenities) => studio_mut(model)?.amenities = amenities,
        FormAction::SetStartDate(date) => workshop_mut(model)?.start_date = date,
        FormAction::SetEndDate(date) => workshop_mut(model)?.end_date = date,
        FormAction::SetMediaMode(mode) => workshop_mut(model)?.media_mode = mode,
        FormAction::AddSchedule => studio_mut(model)?.schedules.push(ClassSchedule::default()),
        FormAction::UpdateSchedule {
            index,
            mut schedule,
        } => {
            let row = schedule_mut(studio_mut(model)?, index)?;
            schedule.key = row.key.clone();
            schedule.days = dedup_days(schedule.days);
            schedule.days_text = if schedule.days == row.days {
                row.days_text.clone()
            } else {
                None
            };
            *row = schedule;
        }
        FormAction::RemoveSchedule(index) => {
            let studio = studio_mut(model)?;
            check_index("schedules", index, studio.schedules.len())?;
            studio.schedules.remove(index);
        }
        FormAction::ToggleScheduleDay { index, day } => {
            let row = schedule_mut(studio_mut(model)?, index)?;
            row.days_text = None;
            match row.days.iter().position(|selected| *selected == day) {
                Some(position) => {
                    row.days.remove(position);
                }
                None => row.days.push(day),
            }
        }
        FormAction::ToggleDayClosed(day) => studio_mut(model)?.timings.toggle_closed(day),
        FormAction::AddSlot(day) => studio_mut(model)?.timings.add_slot(day),
        FormAction::RemoveSlot { day, index } => {
            studio_mut(model)?.timings.remove_slot(day, index)
        }
        FormAction::SetSlot {
            day,
            index,
            open,
            close,
        } => studio_mut(model)?
            .timings
            .set_slot(day, index, &open, &close)?,
        FormAction::AddVariant => workshop_mut(model)?
            .variants
            .push(WorkshopVariant::default()),
        FormAction::RemoveVariant(index) => {
            let workshop = workshop_mut(model)?;
            check_index("variants", index, workshop.variants.len())?;
            workshop.variants.remove(index);
        }
        FormAction::UpdateVariant { index, details } => {
            let variant = variant_mut(workshop_mut(model)?, index)?;
            variant.date = details.date;
            variant.start_time = details.start_time;
            variant.end_time = details.end_time;
            variant.description = details.description;
        }
        FormAction::AddSubvariant { variant } => {
            variant_mut(workshop_mut(model)?, variant)?
                .subvariants
                .push(Subvariant::default());
        }
        FormAction::RemoveSubvariant { variant, index } => {
            let variant = variant_mut(workshop_mut(model)?, variant)?;
            check_index("subvariants", index, variant.subvariants.len())?;
            variant.subvariants.remove(index);
        }
        FormAction::UpdateSubvariant {
            variant,
            index,
            details,
        } => {
            let variant = variant_mut(workshop_mut(model)?, variant)?;
            check_index("subvariants", index, variant.subvariants.len())?;
            let row = &mut variant.subvariants[index];
            row.price = details.price;
            row.capacity = details.capacity;
            row.description = details.description;
        }
        FormAction::SelectVenueType(venue_type) => {
            let workshop = workshop_mut(model)?;
            if workshop.venue_type != venue_type {
                workshop.venue_type = venue_type;
                clear_venue(workshop);
            }
        }
        FormAction::SelectLocation(location) => {
            let workshop = workshop_mut(model)?;
            let venue = derive_venue(&location);
            workshop.venue_type = VenueType::AssociatedLocation;
            workshop.location_id = Some(venue.location_id);
            workshop.studio_association = Some(venue.association);
            workshop.address = venue.address;
        }
        FormAction::ClearLocation => clear_venue(workshop_mut(model)?),
        FormAction::ApplyResolvedAddress(resolved) => {
            let point = Geolocation {
                lat: resolved.lat,
                lng: resolved.lng,
            };
            match &mut model.entity {
                EntityDraft::Studio(studio) => {
                    studio.map_address = resolved.formatted_address;
                    studio.geolocation = Some(point);
                }
                EntityDraft::Workshop(workshop) => {
                    if workshop.venue_type == VenueType::AssociatedLocation {
                        return Err(FormError::ReadOnlyField {
                            field: "map_address",
                        });
                    }
                    workshop.address.map_address = resolved.formatted_address;
                    workshop.address.geolocation = format_geolocation(point);
                }
            }
        }
        FormAction::AddMedia { category, files } => {
            media_mut(model, category)?.add_local(files)?;
        }
        FormAction::RemoveExistingMedia { category, url } => {
            media_mut(model, category)?.remove_existing(&url)?;
        }
        FormAction::RemoveLocalMedia { category, id } => {
            media_mut(model, category)?
                .remove_local(id)
                .ok_or_else(|| MediaError::UnknownLocalFile {
                    category,
                    id: id.to_string(),
                })?;
        }
        FormAction::Reset => *model = model.initial(),
    }
    Ok(())
}

fn studio_mut(model: &mut FormModel) -> Result<&mut StudioDraft, FormError> {
    match &mut model.entity {
        EntityDraft::Studio(studio) => Ok(studio),
        EntityDraft::Workshop(_) => Err(FormError::WrongEntityKind {
            expected: EntityKind::Studio,
            actual: EntityKind::Workshop,
        }),
    }
}

fn workshop_mut(model: &mut FormModel) -> Result<&mut WorkshopDraft, FormError> {
    match &mut model.entity {
        EntityDraft::Workshop(workshop) => Ok(workshop),
        EntityDraft::Studio(_) => Err(FormError::WrongEntityKind {
            expected: EntityKind::Workshop,
            actual: EntityKind::Studio,
        }),
    }
}

fn media_mut(model: &mut FormModel, category: MediaCategory) -> Result<&mut MediaSet, FormError> {
    model
        .media
        .get_mut(&category)
        .ok_or(FormError::Media(MediaError::UnknownCategory(category)))
}

fn check_index(collection: &'static str, index: usize, len: usize) -> Result<(), FormError> {
    if index < len {
        Ok(())
    } else {
        Err(FormError::IndexOutOfRange { collection, index })
    }
}

fn schedule_mut(studio: &mut StudioDraft, index: usize) -> Result<&mut ClassSchedule, FormError> {
    studio
        .schedules
        .get_mut(index)
        .ok_or(FormError::IndexOutOfRange {
            collection: "schedules",
            index,
        })
}

fn variant_mut(
    workshop: &mut WorkshopDraft,
    index: usize,
) -> Result<&mut WorkshopVariant, FormError> {
    workshop
        .variants
        .get_mut(index)
        .ok_or(FormError::IndexOutOfRange {
            collection: "variants",
            index,
        })
}

fn clear_venue(workshop: &mut WorkshopDraft) {
    workshop.location_id = None;
    workshop.studio_association = None;
    workshop.address = VenueAddress::default();
}

fn dedup_days(days: Vec<Weekday>) -> Vec<Weekday> {
    let mut unique = Vec::with_capacity(days.len());
    for day in days {
        if !unique.contains(&day) {
            unique.push(day);
        }
    }
    unique
}

fn address_field_name(field: WorkshopField) -> &'static str {
    match field {
        WorkshopField::Building => "building",
        WorkshopField::Street => "street",
        WorkshopField::City => "city",
        WorkshopField::State => "state",
        WorkshopField::Landmark => "landmark",
        WorkshopField::MapAddress => "map_address",
        WorkshopField::Name
        | WorkshopField::Description
        | WorkshopField::YoutubeLink
        | WorkshopField::Level
        | WorkshopField::CreatorEmail => "workshop",
    }
}
