use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

use crate::clients::ticketmaster::{RawEvent, RawImage};
use crate::models::event::{EventRecord, ImageRef, PriceRange};

pub const EVENT_SOURCE: &str = "Ticketmaster";

// Ordered keyword tables, first match wins. Order is part of the contract:
// "motorsports" hits the "sports" entry before its own, as the tables have
// always behaved.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("music", "🎵 Music"),
    ("sports", "🏆 Sports"),
    ("arts", "🎨 Arts"),
    ("theatre", "🎭 Theatre"),
    ("family", "👨‍👩‍👧‍👦 Family"),
    ("comedy", "😂 Comedy"),
    ("magic", "✨ Magic"),
    ("food", "🍽️ Food"),
    ("exhibition", "🖼️ Exhibition"),
    ("experience", "🎯 Experience"),
    ("motorsports", "🏎️ Motorsports"),
    ("racing", "🏁 Racing"),
    ("aquarium", "🐠 Aquarium"),
    ("immersive", "🌟 Immersive"),
    ("battle", "⚔️ Battle"),
    ("brunch", "🍳 Brunch"),
];

pub const DEFAULT_CATEGORY_LABEL: &str = "🎪 Other Events";

const VENUE_MARKERS: &[(&str, &str)] = &[
    ("arena", "🏟️"),
    ("theater", "🎭"),
    ("theatre", "🎭"),
    ("stadium", "🏟️"),
    ("speedway", "🏎️"),
    ("garden", "🌳"),
    ("hall", "🏛️"),
    ("center", "🎪"),
    ("room", "🎵"),
    ("lounge", "🎵"),
    ("club", "🎉"),
    ("casino", "🎰"),
    ("sphere", "🌐"),
    ("park", "🌳"),
];

const DEFAULT_VENUE_MARKER: &str = "📍";

/// Why one raw record was dropped. Stays inside the normalizer; the batch
/// continues past it.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("undecodable event record: {0}")]
    Decode(String),
    #[error("event record is missing a usable start date")]
    MissingDate,
    #[error("unparsable start date or time {0:?}")]
    BadDate(String),
}

/// Decode and normalize one raw Discovery record. Any failure is scoped to
/// this record alone.
pub fn normalize_record(
    value: &serde_json::Value,
    include_images: bool,
    tz: Tz,
) -> Result<EventRecord, NormalizeError> {
    let raw: RawEvent =
        serde_json::from_value(value.clone()).map_err(|e| NormalizeError::Decode(e.to_string()))?;
    normalize_event(&raw, include_images, tz)
}

pub fn normalize_event(
    raw: &RawEvent,
    include_images: bool,
    tz: Tz,
) -> Result<EventRecord, NormalizeError> {
    let venue_names: Vec<String> = raw
        .embedded
        .as_ref()
        .map(|embedded| {
            embedded
                .venues
                .iter()
                .filter_map(|venue| venue.name.clone())
                .collect()
        })
        .unwrap_or_default();
    let venue = venue_label(&venue_names.join(" & "));

    let segment = raw
        .classifications
        .first()
        .and_then(|classification| classification.segment.as_ref())
        .and_then(|segment| segment.name.as_deref())
        .unwrap_or("Event");
    let category = canonical_category(segment);

    let start = raw
        .dates
        .as_ref()
        .and_then(|dates| dates.start.as_ref())
        .ok_or(NormalizeError::MissingDate)?;
    let local_date = start.local_date.as_deref().ok_or(NormalizeError::MissingDate)?;
    let date = NaiveDate::parse_from_str(local_date, "%Y-%m-%d")
        .map_err(|_| NormalizeError::BadDate(local_date.to_string()))?;
    let local_time = start.local_time.as_deref().unwrap_or("00:00:00");
    let time = NaiveTime::parse_from_str(local_time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(local_time, "%H:%M"))
        .map_err(|_| NormalizeError::BadDate(local_time.to_string()))?;
    let naive = date.and_time(time);
    let start_moment = tz
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive));

    let price_range = if raw.price_ranges.is_empty() {
        None
    } else {
        let min = raw
            .price_ranges
            .iter()
            .map(|tier| tier.min.unwrap_or(0.0))
            .fold(f64::INFINITY, f64::min);
        let max = raw
            .price_ranges
            .iter()
            .map(|tier| tier.max.unwrap_or(0.0))
            .fold(f64::NEG_INFINITY, f64::max);
        Some(PriceRange { min, max })
    };

    let status = raw
        .dates
        .as_ref()
        .and_then(|dates| dates.status.as_ref())
        .and_then(|status| status.code.clone())
        .unwrap_or_default();

    let images = if include_images {
        select_images(&raw.images)
    } else {
        Vec::new()
    };

    Ok(EventRecord {
        name: raw.name.clone(),
        venue,
        category,
        start_moment,
        status,
        price_range,
        images,
        url: raw.url.clone().unwrap_or_default(),
        source: EVENT_SOURCE.to_string(),
    })
}

pub fn canonical_category(raw: &str) -> String {
    let lower = raw.to_lowercase();
    for (keyword, label) in CATEGORY_LABELS {
        if lower.contains(keyword) {
            return (*label).to_string();
        }
    }
    DEFAULT_CATEGORY_LABEL.to_string()
}

pub fn venue_label(joined: &str) -> String {
    let lower = joined.to_lowercase();
    for (keyword, marker) in VENUE_MARKERS {
        if lower.contains(keyword) {
            return format!("{} {}", marker, joined);
        }
    }
    format!("{} {}", DEFAULT_VENUE_MARKER, joined)
}

// Medium 16:9 images read best in embeds; fall back to whatever the feed has.
fn select_images(images: &[RawImage]) -> Vec<ImageRef> {
    let preferred: Vec<&RawImage> = images
        .iter()
        .filter(|img| (640..=800).contains(&img.width) && img.ratio.as_deref() == Some("16_9"))
        .collect();
    let picked: Vec<&RawImage> = if preferred.is_empty() {
        images.iter().take(2).collect()
    } else {
        preferred.into_iter().take(2).collect()
    };
    picked
        .into_iter()
        .map(|img| ImageRef {
            url: img.url.clone(),
            width: img.width,
            ratio: img.ratio.clone().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;
    use serde_json::json;

    fn full_record() -> serde_json::Value {
        json!({
            "name": "Punk Rock Bowling",
            "url": "https://tickets.example/prb",
            "dates": {
                "start": {"localDate": "2024-06-15", "localTime": "19:30:00"},
                "status": {"code": "onsale"}
            },
            "priceRanges": [
                {"min": 40.0, "max": 120.0},
                {"min": 30.0, "max": 200.0}
            ],
            "images": [
                {"url": "https://img.example/wide", "width": 1024, "ratio": "16_9"},
                {"url": "https://img.example/medium", "width": 640, "ratio": "16_9"},
                {"url": "https://img.example/square", "width": 640, "ratio": "1_1"}
            ],
            "classifications": [{"segment": {"name": "Live Music Festival"}}],
            "_embedded": {"venues": [{"name": "Downtown Events Center"}]}
        })
    }

    #[test]
    fn normalizes_a_full_record() {
        let record = normalize_record(&full_record(), true, Los_Angeles).unwrap();
        assert_eq!(record.name, "Punk Rock Bowling");
        assert_eq!(record.venue, "🎪 Downtown Events Center");
        assert_eq!(record.category, "🎵 Music");
        assert_eq!(record.status, "onsale");
        assert_eq!(record.url, "https://tickets.example/prb");
        assert_eq!(record.source, EVENT_SOURCE);
        assert_eq!(
            record.start_moment,
            Los_Angeles.with_ymd_and_hms(2024, 6, 15, 19, 30, 0).unwrap()
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = normalize_record(&full_record(), true, Los_Angeles).unwrap();
        let second = normalize_record(&full_record(), true, Los_Angeles).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn price_range_folds_across_tiers() {
        let record = normalize_record(&full_record(), true, Los_Angeles).unwrap();
        assert_eq!(record.price_range, Some(PriceRange { min: 30.0, max: 200.0 }));
    }

    #[test]
    fn missing_price_tiers_mean_no_range() {
        let mut value = full_record();
        value.as_object_mut().unwrap().remove("priceRanges");
        let record = normalize_record(&value, true, Los_Angeles).unwrap();
        assert_eq!(record.price_range, None);
    }

    #[test]
    fn category_matching_is_substring_and_case_insensitive() {
        assert_eq!(canonical_category("Live Music Festival"), "🎵 Music");
        assert_eq!(canonical_category("SPORTS"), "🏆 Sports");
        assert_eq!(canonical_category("Miscellaneous"), DEFAULT_CATEGORY_LABEL);
    }

    #[test]
    fn venues_are_joined_with_an_ampersand() {
        let mut value = full_record();
        value["_embedded"]["venues"] = json!([{"name": "T-Mobile Arena"}, {"name": "Toshiba Plaza"}]);
        let record = normalize_record(&value, true, Los_Angeles).unwrap();
        assert_eq!(record.venue, "🏟️ T-Mobile Arena & Toshiba Plaza");
    }

    #[test]
    fn unknown_venue_gets_the_default_marker() {
        assert_eq!(venue_label("The Basement"), "📍 The Basement");
    }

    #[test]
    fn missing_local_date_is_unparsable() {
        let mut value = full_record();
        value["dates"]["start"] = json!({"localTime": "19:30:00"});
        let result = normalize_record(&value, true, Los_Angeles);
        assert!(matches!(result, Err(NormalizeError::MissingDate)));
    }

    #[test]
    fn missing_local_time_defaults_to_midnight() {
        let mut value = full_record();
        value["dates"]["start"] = json!({"localDate": "2024-06-15"});
        let record = normalize_record(&value, true, Los_Angeles).unwrap();
        assert_eq!(
            record.start_moment,
            Los_Angeles.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn nameless_record_fails_to_decode() {
        let mut value = full_record();
        value.as_object_mut().unwrap().remove("name");
        let result = normalize_record(&value, true, Los_Angeles);
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn images_prefer_medium_sixteen_by_nine() {
        let record = normalize_record(&full_record(), true, Los_Angeles).unwrap();
        assert_eq!(record.images.len(), 1);
        assert_eq!(record.images[0].url, "https://img.example/medium");
    }

    #[test]
    fn images_fall_back_to_the_first_two() {
        let mut value = full_record();
        value["images"] = json!([
            {"url": "https://img.example/a", "width": 100, "ratio": "4_3"},
            {"url": "https://img.example/b", "width": 200, "ratio": "4_3"},
            {"url": "https://img.example/c", "width": 300, "ratio": "4_3"}
        ]);
        let record = normalize_record(&value, true, Los_Angeles).unwrap();
        assert_eq!(record.images.len(), 2);
        assert_eq!(record.images[0].url, "https://img.example/a");
        assert_eq!(record.images[1].url, "https://img.example/b");
    }

    #[test]
    fn images_can_be_disabled() {
        let record = normalize_record(&full_record(), false, Los_Angeles).unwrap();
        assert!(record.images.is_empty());
    }
}
