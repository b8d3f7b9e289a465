//! Wizard gating. Each step is checked before the operator moves on and the
//! whole form is checked again before any backend call.

use shared::domain::{MediaCategory, Weekday};

use crate::{
    error::ValidationErrors,
    model::{ClassSchedule, FormModel, MediaMode, StudioDraft, WorkshopDraft},
    timings::{parse_clock_range, WeeklyTimings},
    venue::VenueType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    /// Studio details and address, or workshop info, venue and media.
    Basics,
    /// Studio classes and timings, or workshop variants.
    Schedule,
}

impl WizardStep {
    pub const ALL: [WizardStep; 2] = [WizardStep::Basics, WizardStep::Schedule];

    pub fn number(self) -> u8 {
        match self {
            Self::Basics => 1,
            Self::Schedule => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Basics),
            2 => Some(Self::Schedule),
            _ => None,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Basics => Some(Self::Schedule),
            Self::Schedule => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Basics => None,
            Self::Schedule => Some(Self::Basics),
        }
    }
}

pub fn per_step(step: WizardStep, model: &FormModel) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let Some(studio) = model.studio() {
        match step {
            WizardStep::Basics => studio_basics(studio, &mut errors),
            WizardStep::Schedule => studio_schedule(studio, &mut errors),
        }
    }
    if let Some(workshop) = model.workshop() {
        match step {
            WizardStep::Basics => workshop_basics(workshop, model, &mut errors),
            WizardStep::Schedule => workshop_variants(workshop, &mut errors),
        }
    }
    errors
}

/// Every step plus media counts. Always run before submission.
pub fn full(model: &FormModel) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for step in WizardStep::ALL {
        errors.extend(per_step(step, model));
    }
    media_counts(model, &mut errors);
    errors
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn has_any(values: &[String]) -> bool {
    values.iter().any(|value| !value.trim().is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "email is required");
    } else if !is_valid_email(value) {
        errors.push(field, "email is not valid");
    }
}

fn studio_basics(studio: &StudioDraft, errors: &mut ValidationErrors) {
    require(errors, "studio_name", &studio.studio_name, "studio name is required");
    require(errors, "founder_name", &studio.founder_name, "founder name is required");
    require(errors, "mobile_number", &studio.mobile_number, "mobile number is required");
    email(errors, "mail_address", &studio.mail_address);
    if !has_any(&studio.dance_styles) {
        errors.push("dance_styles", "select at least one dance style");
    }
    require(errors, "building_name", &studio.building_name, "building is required");
    require(errors, "street", &studio.street, "street is required");
    require(errors, "city", &studio.city, "city is required");
    require(errors, "state", &studio.state, "state is required");
    require(errors, "pincode", &studio.pincode, "pincode is required");
}

fn studio_schedule(studio: &StudioDraft, errors: &mut ValidationErrors) {
    for (index, schedule) in studio.schedules.iter().enumerate() {
        class_schedule(index, schedule, errors);
    }
    weekly_timings(&studio.timings, errors);
}

fn class_schedule(index: usize, schedule: &ClassSchedule, errors: &mut ValidationErrors) {
    let field = |name: &str| format!("schedules[{index}].{name}");
    require(errors, &field("class_name"), &schedule.class_name, "class name is required");
    require(errors, &field("dance_form"), &schedule.dance_form, "dance form is required");
    if !schedule.has_days() {
        errors.push(field("days"), "select at least one day");
    }
    match parse_clock_range(&schedule.time) {
        Some((start, end)) if start < end => {}
        Some(_) => errors.push(field("time"), "class must end after it starts"),
        None => errors.push(field("time"), "time must look like 06:00 PM - 07:00 PM"),
    }
    require(errors, &field("fee"), &schedule.fee, "fee is required");
    require(errors, &field("level"), &schedule.level, "level is required");
}

fn weekly_timings(timings: &WeeklyTimings, errors: &mut ValidationErrors) {
    for day in Weekday::ALL {
        let field = format!("timings.{}", day.key());
        let slots = timings.slots(day);
        if slots.is_empty() {
            errors.push(field, "day has no opening hours");
            continue;
        }
        if timings.is_closed(day) {
            continue;
        }
        for (index, slot) in slots.iter().enumerate() {
            match slot.range() {
                Some((open, close)) if open < close => {}
                Some(_) => errors.push(
                    format!("{field}[{index}]"),
                    "closing time must be after opening time",
                ),
                None => errors.push(format!("{field}[{index}]"), "slot has an invalid time"),
            }
        }
    }
}

fn workshop_basics(workshop: &WorkshopDraft, model: &FormModel, errors: &mut ValidationErrors) {
    require(errors, "name", &workshop.name, "workshop name is required");
    email(errors, "creator_email", &workshop.creator_email);
    require(errors, "description", &workshop.description, "description is required");
    if !has_any(&workshop.dance_styles) {
        errors.push("dance_styles", "select at least one dance style");
    }
    require(errors, "level", &workshop.level, "level is required");
    match (workshop.start_date, workshop.end_date) {
        (Some(start), Some(end)) if end < start => {
            errors.push("end_date", "end date cannot be before start date")
        }
        (start, end) => {
            if start.is_none() {
                errors.push("start_date", "start date is required");
            }
            if end.is_none() {
                errors.push("end_date", "end date is required");
            }
        }
    }

    if workshop.venue_type == VenueType::AssociatedLocation && workshop.location_id.is_none() {
        errors.push("location", "select a studio location");
    }
    require(errors, "building", &workshop.address.building, "building is required");
    require(errors, "street", &workshop.address.street, "street is required");
    require(errors, "city", &workshop.address.city, "city is required");

    let has_image = model
        .media_set(MediaCategory::WorkshopIcon)
        .is_some_and(|set| set.visible_count() > 0);
    match workshop.media_mode {
        MediaMode::Image if !has_image => errors.push("media", "add an image"),
        MediaMode::VideoLink if workshop.youtube_link.trim().is_empty() => {
            errors.push("media", "add a video link")
        }
        MediaMode::VideoLink if has_image => {
            errors.push("media", "remove the image to use a video link")
        }
        _ => {}
    }
}

fn workshop_variants(workshop: &WorkshopDraft, errors: &mut ValidationErrors) {
    if workshop.variants.is_empty() {
        errors.push("variants", "add at least one variant");
    }
    for (index, variant) in workshop.variants.iter().enumerate() {
        let field = |name: &str| format!("variants[{index}].{name}");
        if variant.date.is_none() {
            errors.push(field("date"), "date is required");
        }
        match (variant.start_time, variant.end_time) {
            (Some(start), Some(end)) if start < end => {}
            (Some(_), Some(_)) => errors.push(field("time"), "end time must be after start time"),
            _ => errors.push(field("time"), "start and end time are required"),
        }
        require(errors, &field("description"), &variant.description, "description is required");
        if variant.subvariants.is_empty() {
            errors.push(field("subvariants"), "add at least one pricing option");
        }
        for (sub, subvariant) in variant.subvariants.iter().enumerate() {
            let field = |name: &str| format!("variants[{index}].subvariants[{sub}].{name}");
            if !subvariant
                .price
                .trim()
                .parse::<f64>()
                .is_ok_and(|price| price > 0.0)
            {
                errors.push(field("price"), "price must be greater than zero");
            }
            if !subvariant
                .capacity
                .trim()
                .parse::<u32>()
                .is_ok_and(|capacity| capacity > 0)
            {
                errors.push(field("capacity"), "capacity must be a whole number above zero");
            }
            require(
                errors,
                &field("description"),
                &subvariant.description,
                "description is required",
            );
        }
    }
}

fn media_counts(model: &FormModel, errors: &mut ValidationErrors) {
    for set in model.media.values() {
        let count = set.visible_count();
        let field = format!("media.{}", set.category.name());
        if count < set.config.min_count {
            errors.push(
                field,
                format!("{} needs at least {}", set.category, set.config.min_count),
            );
        } else if count > set.config.max_count {
            errors.push(
                field,
                format!("{} holds at most {}", set.category, set.config.max_count),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        media::{LocalFile, MediaSet, RemoteRef},
        model::{Subvariant, WorkshopVariant},
        reducer::{reduce, FormAction},
        timings::TimeSlot,
    };
    use chrono::{NaiveDate, NaiveTime};
    use shared::{domain::EntityKind, protocol::LocationSummary};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("time")
    }

    fn independent_workshop_with_video() -> FormModel {
        let mut model = FormModel::new(EntityKind::Workshop);
        if let crate::model::EntityDraft::Workshop(workshop) = &mut model.entity {
            workshop.name = "Contemporary weekend".into();
            workshop.creator_email = "guru@example.com".into();
            workshop.description = "Two days of floor work".into();
            workshop.dance_styles = vec!["Contemporary".into()];
            workshop.level = "Beginner".into();
            workshop.start_date = Some(date(2026, 11, 7));
            workshop.end_date = Some(date(2026, 11, 8));
            workshop.venue_type = VenueType::Independent;
            workshop.address.building = "Hall 3".into();
            workshop.address.street = "FC Road".into();
            workshop.address.city = "Pune".into();
            workshop.youtube_link = "https://youtu.be/abc".into();
            workshop.media_mode = MediaMode::VideoLink;
            workshop.variants = vec![WorkshopVariant {
                id: None,
                date: Some(date(2026, 11, 7)),
                start_time: Some(time(10, 0)),
                end_time: Some(time(12, 0)),
                description: "Morning".into(),
                subvariants: vec![Subvariant {
                    id: None,
                    price: "499".into(),
                    capacity: "20".into(),
                    description: "Solo".into(),
                }],
            }];
        }
        model
    }

    #[test]
    fn independent_workshop_with_video_link_passes_first_step() {
        let model = independent_workshop_with_video();
        let errors = per_step(WizardStep::Basics, &model);
        assert!(errors.is_empty(), "unexpected errors: {errors}");
        assert!(full(&model).is_empty());
    }

    #[test]
    fn associated_venue_without_location_flags_location_field() {
        let model = reduce(
            &independent_workshop_with_video(),
            FormAction::SelectVenueType(VenueType::AssociatedLocation),
        )
        .expect("venue type");
        let errors = per_step(WizardStep::Basics, &model);
        assert!(errors.has_field("location"));

        let model = reduce(
            &model,
            FormAction::SelectLocation(LocationSummary {
                id: shared::domain::LocationId::new("S1"),
                building_name: "Sunrise Towers".into(),
                street: "MG Road".into(),
                city: "Pune".into(),
                ..LocationSummary::default()
            }),
        )
        .expect("location");
        assert!(per_step(WizardStep::Basics, &model).is_empty());
    }

    #[test]
    fn media_requirement_follows_selected_mode() {
        let mut model = independent_workshop_with_video();
        model.media.insert(
            MediaCategory::WorkshopIcon,
            MediaSet::new(MediaCategory::WorkshopIcon)
                .with_existing(vec![RemoteRef::new("https://cdn.example.com/icon.jpg")]),
        );
        assert_eq!(
            per_step(WizardStep::Basics, &model).message_for("media"),
            Some("remove the image to use a video link")
        );

        // The link typed earlier is ignored once the image mode is chosen.
        let model = reduce(&model, FormAction::SetMediaMode(MediaMode::Image)).expect("mode");
        assert!(per_step(WizardStep::Basics, &model).is_empty());

        let without_icon = reduce(
            &model,
            FormAction::RemoveExistingMedia {
                category: MediaCategory::WorkshopIcon,
                url: "https://cdn.example.com/icon.jpg".into(),
            },
        )
        .expect("remove icon");
        assert_eq!(
            per_step(WizardStep::Basics, &without_icon).message_for("media"),
            Some("add an image")
        );

        let video = reduce(&without_icon, FormAction::SetMediaMode(MediaMode::VideoLink))
            .expect("mode");
        assert!(per_step(WizardStep::Basics, &video).is_empty());
        let video = reduce(
            &video,
            FormAction::SetWorkshopField {
                field: crate::model::WorkshopField::YoutubeLink,
                value: "  ".into(),
            },
        )
        .expect("clear link");
        assert_eq!(
            per_step(WizardStep::Basics, &video).message_for("media"),
            Some("add a video link")
        );
    }

    #[test]
    fn end_date_before_start_date_is_rejected() {
        let model = reduce(
            &independent_workshop_with_video(),
            FormAction::SetEndDate(Some(date(2026, 11, 1))),
        )
        .expect("end date");
        assert_eq!(
            per_step(WizardStep::Basics, &model).message_for("end_date"),
            Some("end date cannot be before start date")
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(is_valid_email("guru@example.com"));
        for bad in ["guru", "guru@", "@example.com", "gu ru@example.com", "a@b@c.com", "a@b."] {
            assert!(!is_valid_email(bad), "{bad} accepted");
        }
    }

    #[test]
    fn variant_rows_are_checked_field_by_field() {
        let model = independent_workshop_with_video();
        let model = reduce(
            &model,
            FormAction::UpdateSubvariant {
                variant: 0,
                index: 0,
                details: crate::reducer::SubvariantDetails {
                    price: "0".into(),
                    capacity: "2.5".into(),
                    description: String::new(),
                },
            },
        )
        .expect("subvariant");
        let model = reduce(&model, FormAction::AddVariant).expect("variant");
        let errors = per_step(WizardStep::Schedule, &model);

        assert!(errors.has_field("variants[0].subvariants[0].price"));
        assert!(errors.has_field("variants[0].subvariants[0].capacity"));
        assert!(errors.has_field("variants[0].subvariants[0].description"));
        assert!(errors.has_field("variants[1].date"));
        assert!(errors.has_field("variants[1].time"));
        assert!(!errors.has_field("variants[0].date"));

        let model = reduce(&model, FormAction::RemoveVariant(1)).expect("remove");
        let model = reduce(&model, FormAction::RemoveVariant(0)).expect("remove");
        assert!(per_step(WizardStep::Schedule, &model).has_field("variants"));
    }

    #[test]
    fn studio_steps_cover_details_schedules_and_timings() {
        let model = FormModel::new(EntityKind::Studio);
        let basics = per_step(WizardStep::Basics, &model);
        for field in ["studio_name", "founder_name", "mobile_number", "mail_address", "pincode"] {
            assert!(basics.has_field(field), "{field} not flagged");
        }

        let mut model = reduce(&model, FormAction::AddSchedule).expect("schedule");
        if let crate::model::EntityDraft::Studio(studio) = &mut model.entity {
            studio.schedules[0].time = "07:00 PM - 06:00 PM".into();
            studio.timings = WeeklyTimings::default();
        }
        let model = reduce(
            &model,
            FormAction::SetSlot {
                day: Weekday::Monday,
                index: 0,
                open: "06:00 PM".into(),
                close: "09:00 AM".into(),
            },
        )
        .expect("slot");
        let schedule = per_step(WizardStep::Schedule, &model);
        assert_eq!(
            schedule.message_for("schedules[0].time"),
            Some("class must end after it starts")
        );
        assert!(schedule.has_field("schedules[0].days"));
        assert!(schedule.has_field("timings.monday[0]"));
        assert!(!schedule.has_field("timings.tuesday[0]"));
        assert_eq!(
            model.studio().expect("studio").timings.slots(Weekday::Monday),
            &[TimeSlot::new("06:00 PM", "09:00 AM")]
        );
    }

    #[test]
    fn full_validation_checks_media_counts() {
        let mut model = FormModel::new(EntityKind::Studio);
        let overfull: Vec<RemoteRef> = (0..2)
            .map(|i| RemoteRef::new(format!("https://cdn.example.com/logo{i}.jpg")))
            .collect();
        model.media.insert(
            MediaCategory::StudioLogo,
            MediaSet::new(MediaCategory::StudioLogo).with_existing(overfull),
        );
        let errors = full(&model);
        assert!(errors.has_field("media.logo"));
        assert!(!per_step(WizardStep::Basics, &model).has_field("media.logo"));

        let mut photos = MediaSet::new(MediaCategory::StudioPhotos);
        photos
            .add_local(vec![LocalFile::new("a.jpg", "image/jpeg", vec![1])])
            .expect("add");
        model.media.insert(MediaCategory::StudioPhotos, photos);
        assert!(!full(&model).has_field("media.photos"));
    }
}
