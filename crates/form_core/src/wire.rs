//! Mapping between form drafts and backend records.
//!
//! Both directions use the same delimiters and neither trims nor filters
//! list items. Schedule days keep the text they were loaded with. An
//! unmodified hydrated form produces the record it was loaded from.

use chrono::{NaiveDate, NaiveTime};
use shared::{
    domain::Weekday,
    protocol::{
        ClassScheduleRecord, EntityPayload, StudioRecord, SubvariantRecord, VariantRecord,
        WorkshopPayload, WorkshopRecord,
    },
};

use crate::{
    model::{
        ClassSchedule, EntityDraft, FormModel, MediaMode, StudioDraft, Subvariant, WorkshopDraft,
        WorkshopVariant,
    },
    timings::{parse_clock, WeeklyTimings},
    venue::{location_id_from_association, VenueAddress, VenueType},
};

pub const LIST_DELIMITER: &str = ", ";
pub const DAY_DELIMITER: &str = ",";
const DATE_FORMAT: &str = "%Y-%m-%d";
/// Variant times are stored as `HH:MM:SS-HH:MM:SS`.
const VARIANT_TIME_FORMAT: &str = "%H:%M:%S";

pub fn split_list(text: &str, delimiter: &str) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(delimiter).map(str::to_string).collect()
    }
}

pub fn join_list(items: &[String], delimiter: &str) -> String {
    items.join(delimiter)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Accepts `HH:MM:SS`, `HH:MM` and the 12-hour `hh:mm AM` form.
fn parse_variant_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    [VARIANT_TIME_FORMAT, "%H:%M"]
        .into_iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .or_else(|| parse_clock(text))
}

fn parse_variant_range(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = text.split_once('-')?;
    Some((parse_variant_time(start)?, parse_variant_time(end)?))
}

/// Builds the primary create/update body.
///
/// Rows added in this form get positional ids (`NEW_1`, `NEW_0_1`, ...).
/// They are unique within one payload only.
pub fn transform(model: &FormModel) -> EntityPayload {
    match &model.entity {
        EntityDraft::Studio(studio) => EntityPayload::Studio(studio_record(studio)),
        EntityDraft::Workshop(workshop) => EntityPayload::Workshop(workshop_payload(workshop)),
    }
}

fn studio_record(studio: &StudioDraft) -> StudioRecord {
    let table_data = studio
        .schedules
        .iter()
        .enumerate()
        .map(|(index, schedule)| {
            let key = schedule
                .key
                .clone()
                .unwrap_or_else(|| format!("NEW_{}", index + 1));
            (key, schedule_record(schedule))
        })
        .collect();

    StudioRecord {
        studio_name: studio.studio_name.clone(),
        founder_name: studio.founder_name.clone(),
        about_studio: studio.about_studio.clone(),
        about_founder: studio.about_founder.clone(),
        mobile_number: studio.mobile_number.clone(),
        mail_address: studio.mail_address.clone(),
        whatsapp_number: studio.whatsapp_number.clone(),
        creator_email: studio.creator_email.clone(),
        dance_styles: join_list(&studio.dance_styles, LIST_DELIMITER),
        add_amenities: join_list(&studio.amenities, LIST_DELIMITER),
        maximum_occupancy: studio.maximum_occupancy.clone(),
        number_of_halls: studio.number_of_halls.clone(),
        building_name: studio.building_name.clone(),
        landmark: studio.landmark.clone(),
        street: studio.street.clone(),
        pincode: studio.pincode.clone(),
        city: studio.city.clone(),
        state: studio.state.clone(),
        map_address: studio.map_address.clone(),
        geolocation: studio.geolocation,
        gst_number: studio.gst_number.clone(),
        instagram: studio.instagram.clone(),
        facebook: studio.facebook.clone(),
        youtube: studio.youtube.clone(),
        status: studio.status.clone(),
        table_data,
        timings: studio.timings.to_wire(),
    }
}

fn schedule_record(schedule: &ClassSchedule) -> ClassScheduleRecord {
    let days = schedule.days_text.clone().unwrap_or_else(|| {
        let labels: Vec<String> = schedule
            .days
            .iter()
            .map(|day| day.short_label().to_string())
            .collect();
        join_list(&labels, DAY_DELIMITER)
    });
    ClassScheduleRecord {
        class_name: schedule.class_name.clone(),
        dance_forms: schedule.dance_form.clone(),
        days,
        time: schedule.time.clone(),
        fee: schedule.fee.clone(),
        level: schedule.level.clone(),
        free_trial: schedule.free_trial,
        instructors: join_list(&schedule.instructors, LIST_DELIMITER),
        class_category: join_list(&schedule.categories, LIST_DELIMITER),
    }
}

fn workshop_payload(workshop: &WorkshopDraft) -> WorkshopPayload {
    let studio_association = match workshop.venue_type {
        VenueType::AssociatedLocation => workshop.studio_association.clone(),
        VenueType::Independent => None,
    };
    let record = WorkshopRecord {
        name: workshop.name.clone(),
        description: workshop.description.clone(),
        dance_styles: join_list(&workshop.dance_styles, LIST_DELIMITER),
        youtube_link: match workshop.media_mode {
            MediaMode::VideoLink => workshop.youtube_link.clone(),
            MediaMode::Image => String::new(),
        },
        level: workshop.level.clone(),
        start_date: format_date(workshop.start_date),
        end_date: format_date(workshop.end_date),
        creator_email: workshop.creator_email.clone(),
        studio_association,
        building: workshop.address.building.clone(),
        street: workshop.address.street.clone(),
        city: workshop.address.city.clone(),
        state: workshop.address.state.clone(),
        landmark: workshop.address.landmark.clone(),
        geolocation: workshop.address.geolocation.clone(),
        map_address: workshop.address.map_address.clone(),
    };
    let variants = workshop
        .variants
        .iter()
        .enumerate()
        .map(|(index, variant)| variant_record(index, variant))
        .collect();
    WorkshopPayload {
        workshop: record,
        variants,
    }
}

fn variant_record(index: usize, variant: &WorkshopVariant) -> VariantRecord {
    let time = match (variant.start_time, variant.end_time) {
        (Some(start), Some(end)) => format!(
            "{}-{}",
            start.format(VARIANT_TIME_FORMAT),
            end.format(VARIANT_TIME_FORMAT)
        ),
        _ => String::new(),
    };
    let subvariants = variant
        .subvariants
        .iter()
        .enumerate()
        .map(|(sub, subvariant)| SubvariantRecord {
            subvariant_id: subvariant
                .id
                .clone()
                .unwrap_or_else(|| format!("NEW_{index}_{}", sub + 1)),
            price: subvariant.price.clone(),
            capacity: subvariant.capacity.clone(),
            description: subvariant.description.clone(),
        })
        .collect();
    VariantRecord {
        variant_id: variant
            .id
            .clone()
            .unwrap_or_else(|| format!("NEW_{}", index + 1)),
        date: format_date(variant.date),
        time,
        description: variant.description.clone(),
        subvariants,
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

pub fn studio_draft(record: &StudioRecord) -> StudioDraft {
    let schedules = record
        .table_data
        .iter()
        .map(|(key, row)| ClassSchedule {
            key: Some(key.clone()),
            class_name: row.class_name.clone(),
            dance_form: row.dance_forms.clone(),
            days: split_list(&row.days, DAY_DELIMITER)
                .iter()
                .filter_map(|label| Weekday::from_short_label(label.trim()))
                .collect(),
            days_text: Some(row.days.clone()),
            time: row.time.clone(),
            fee: row.fee.clone(),
            level: row.level.clone(),
            free_trial: row.free_trial,
            instructors: split_list(&row.instructors, LIST_DELIMITER),
            categories: split_list(&row.class_category, LIST_DELIMITER),
        })
        .collect();

    StudioDraft {
        studio_name: record.studio_name.clone(),
        founder_name: record.founder_name.clone(),
        about_studio: record.about_studio.clone(),
        about_founder: record.about_founder.clone(),
        mobile_number: record.mobile_number.clone(),
        mail_address: record.mail_address.clone(),
        whatsapp_number: record.whatsapp_number.clone(),
        creator_email: record.creator_email.clone(),
        dance_styles: split_list(&record.dance_styles, LIST_DELIMITER),
        amenities: split_list(&record.add_amenities, LIST_DELIMITER),
        maximum_occupancy: record.maximum_occupancy.clone(),
        number_of_halls: record.number_of_halls.clone(),
        building_name: record.building_name.clone(),
        landmark: record.landmark.clone(),
        street: record.street.clone(),
        pincode: record.pincode.clone(),
        city: record.city.clone(),
        state: record.state.clone(),
        map_address: record.map_address.clone(),
        geolocation: record.geolocation,
        gst_number: record.gst_number.clone(),
        instagram: record.instagram.clone(),
        facebook: record.facebook.clone(),
        youtube: record.youtube.clone(),
        status: record.status.clone(),
        schedules,
        timings: WeeklyTimings::from_wire(&record.timings),
    }
}

pub fn workshop_draft(record: &WorkshopRecord, variants: &[VariantRecord]) -> WorkshopDraft {
    let association = record
        .studio_association
        .as_deref()
        .and_then(non_empty);
    let (venue_type, location_id) = match &association {
        Some(label) => (
            VenueType::AssociatedLocation,
            location_id_from_association(label),
        ),
        None => (VenueType::Independent, None),
    };
    let media_mode = if record.youtube_link.is_empty() {
        MediaMode::Image
    } else {
        MediaMode::VideoLink
    };

    WorkshopDraft {
        name: record.name.clone(),
        description: record.description.clone(),
        dance_styles: split_list(&record.dance_styles, LIST_DELIMITER),
        youtube_link: record.youtube_link.clone(),
        media_mode,
        level: record.level.clone(),
        start_date: parse_date(&record.start_date),
        end_date: parse_date(&record.end_date),
        creator_email: record.creator_email.clone(),
        venue_type,
        location_id,
        studio_association: association,
        address: VenueAddress {
            building: record.building.clone(),
            street: record.street.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            landmark: record.landmark.clone(),
            map_address: record.map_address.clone(),
            geolocation: record.geolocation.clone(),
        },
        variants: variants.iter().map(variant_draft).collect(),
    }
}

fn variant_draft(record: &VariantRecord) -> WorkshopVariant {
    let range = parse_variant_range(&record.time);
    WorkshopVariant {
        id: non_empty(&record.variant_id),
        date: parse_date(&record.date),
        start_time: range.map(|(start, _)| start),
        end_time: range.map(|(_, end)| end),
        description: record.description.clone(),
        subvariants: record
            .subvariants
            .iter()
            .map(|sub| Subvariant {
                id: non_empty(&sub.subvariant_id),
                price: sub.price.clone(),
                capacity: sub.capacity.clone(),
                description: sub.description.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::EntityKind;

    #[test]
    fn lists_split_and_join_without_trimming() {
        assert_eq!(split_list("", LIST_DELIMITER), Vec::<String>::new());
        assert_eq!(
            split_list("Salsa, Bachata", LIST_DELIMITER),
            vec!["Salsa".to_string(), "Bachata".to_string()]
        );
        let odd = split_list("Salsa,Bachata, ", LIST_DELIMITER);
        assert_eq!(join_list(&odd, LIST_DELIMITER), "Salsa,Bachata, ");
    }

    #[test]
    fn new_rows_get_positional_ids_and_hydrated_rows_keep_theirs() {
        let mut model = FormModel::new(EntityKind::Workshop);
        if let EntityDraft::Workshop(workshop) = &mut model.entity {
            workshop.variants = vec![
                WorkshopVariant {
                    id: Some("V9".into()),
                    subvariants: vec![
                        Subvariant {
                            id: Some("S9".into()),
                            ..Subvariant::default()
                        },
                        Subvariant::default(),
                    ],
                    ..WorkshopVariant::default()
                },
                WorkshopVariant::default(),
            ];
        }
        let EntityPayload::Workshop(payload) = transform(&model) else {
            panic!("expected workshop payload");
        };
        assert_eq!(payload.variants[0].variant_id, "V9");
        assert_eq!(payload.variants[0].subvariants[0].subvariant_id, "S9");
        assert_eq!(payload.variants[0].subvariants[1].subvariant_id, "NEW_0_2");
        assert_eq!(payload.variants[1].variant_id, "NEW_2");
        assert_eq!(payload.variants[1].subvariants[0].subvariant_id, "NEW_1_1");
    }

    #[test]
    fn independent_venue_drops_association_label() {
        let mut model = FormModel::new(EntityKind::Workshop);
        if let EntityDraft::Workshop(workshop) = &mut model.entity {
            workshop.venue_type = VenueType::Independent;
            workshop.studio_association = Some("S1-Stale".into());
        }
        let EntityPayload::Workshop(payload) = transform(&model) else {
            panic!("expected workshop payload");
        };
        assert_eq!(payload.workshop.studio_association, None);
    }

    #[test]
    fn hydrated_association_selects_location_venue() {
        let record = WorkshopRecord {
            studio_association: Some("S42-Rhythm House".into()),
            youtube_link: "https://youtu.be/x".into(),
            start_date: "2026-11-07".into(),
            ..WorkshopRecord::default()
        };
        let draft = workshop_draft(&record, &[]);
        assert_eq!(draft.venue_type, VenueType::AssociatedLocation);
        assert_eq!(
            draft.location_id,
            Some(shared::domain::LocationId::new("S42"))
        );
        assert_eq!(draft.media_mode, MediaMode::VideoLink);
        assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2026, 11, 7));
        assert!(draft.variants.is_empty());
    }

    #[test]
    fn variant_times_read_24_hour_text_and_write_seconds() {
        let stored = VariantRecord {
            variant_id: "V1".into(),
            time: "09:00:00-17:00:00".into(),
            ..VariantRecord::default()
        };
        let short = VariantRecord {
            time: "09:30-11:00".into(),
            ..VariantRecord::default()
        };
        let draft = workshop_draft(&WorkshopRecord::default(), &[stored, short]);

        assert_eq!(draft.variants[0].start_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(draft.variants[0].end_time, NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(variant_record(0, &draft.variants[0]).time, "09:00:00-17:00:00");
        assert_eq!(variant_record(1, &draft.variants[1]).time, "09:30:00-11:00:00");
        assert_eq!(
            parse_variant_range("10:00 AM-12:00 PM"),
            Some((
                NaiveTime::from_hms_opt(10, 0, 0).expect("start"),
                NaiveTime::from_hms_opt(12, 0, 0).expect("end")
            ))
        );
    }

    #[test]
    fn schedule_days_keep_loaded_text() {
        let mut record = StudioRecord::default();
        for (key, days) in [("K1", "Mon, Wed, Thurs"), ("K2", "Tues,Weekends")] {
            record.table_data.insert(
                key.to_string(),
                ClassScheduleRecord {
                    days: days.into(),
                    ..ClassScheduleRecord::default()
                },
            );
        }
        let draft = studio_draft(&record);

        assert_eq!(
            draft.schedules[0].days,
            vec![Weekday::Monday, Weekday::Wednesday, Weekday::Thursday]
        );
        assert_eq!(draft.schedules[1].days, vec![Weekday::Tuesday]);
        let written = studio_record(&draft);
        assert_eq!(written.table_data["K1"].days, "Mon, Wed, Thurs");
        assert_eq!(written.table_data["K2"].days, "Tues,Weekends");

        let mut edited = draft.schedules[0].clone();
        edited.days_text = None;
        assert_eq!(schedule_record(&edited).days, "Mon,Wed,Thurs");
    }

    #[test]
    fn video_link_is_sent_only_in_video_mode() {
        let mut workshop = WorkshopDraft {
            youtube_link: "https://youtu.be/abc".into(),
            media_mode: MediaMode::Image,
            ..WorkshopDraft::default()
        };
        assert_eq!(workshop_payload(&workshop).workshop.youtube_link, "");

        workshop.media_mode = MediaMode::VideoLink;
        assert_eq!(
            workshop_payload(&workshop).workshop.youtube_link,
            "https://youtu.be/abc"
        );
    }
}
