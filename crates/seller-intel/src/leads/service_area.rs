//! Service-area geography: ZIP to neighborhood names and the
//! primary/adjacent classification used by the TD-Fit score.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

static NEIGHBORHOOD_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static ADJACENT_ZIPS: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Coarse classification of how close a ZIP sits to the brokerage's
/// primary service footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAreaClass {
    Primary,
    Adjacent,
    Other,
}

impl ServiceAreaClass {
    pub const fn label(self) -> &'static str {
        match self {
            ServiceAreaClass::Primary => "primary",
            ServiceAreaClass::Adjacent => "adjacent",
            ServiceAreaClass::Other => "other",
        }
    }
}

fn neighborhood_map() -> &'static HashMap<&'static str, &'static str> {
    NEIGHBORHOOD_MAP.get_or_init(|| {
        const ZIP_TO_NEIGHBORHOOD: &[(&str, &str)] = &[
            // Franklin County
            ("43081", "Westerville"),
            ("43082", "Westerville"),
            ("43016", "Dublin"),
            ("43017", "Dublin"),
            ("43065", "Powell"),
            ("43230", "Gahanna"),
            ("43054", "New Albany"),
            ("43026", "Hilliard"),
            ("43220", "Upper Arlington"),
            ("43221", "Upper Arlington"),
            ("43085", "Worthington"),
            ("43123", "Grove City"),
            ("43147", "Pickerington"),
            ("43004", "Blacklick"),
            ("43202", "Clintonville"),
            ("43214", "Clintonville"),
            // Delaware County
            ("43015", "Delaware"),
            ("43035", "Lewis Center"),
            ("43074", "Sunbury"),
        ];

        ZIP_TO_NEIGHBORHOOD.iter().copied().collect()
    })
}

fn adjacent_zips() -> &'static HashSet<&'static str> {
    ADJACENT_ZIPS.get_or_init(|| {
        [
            "43201", "43203", "43204", "43205", "43206", "43207", "43209", "43210", "43211",
            "43212", "43213", "43215", "43217", "43219", "43222", "43223", "43224", "43227",
            "43228", "43229", "43231", "43232", "43235", "43240",
        ]
        .into_iter()
        .collect()
    })
}

fn clean_zip(zip: &str) -> &str {
    let trimmed = zip.trim();
    let end = trimmed
        .char_indices()
        .nth(5)
        .map_or(trimmed.len(), |(idx, _)| idx);
    &trimmed[..end]
}

/// Map a (city, ZIP) pair to a neighborhood name. The ZIP lookup table wins
/// over the city name; an unmapped ZIP falls back to the title-cased city,
/// then "Unknown".
pub fn map_city_to_neighborhood(city: &str, zip: &str) -> String {
    if let Some(name) = neighborhood_map().get(clean_zip(zip)) {
        return (*name).to_string();
    }

    let city = city.trim();
    if !city.is_empty() {
        return title_case(city);
    }

    "Unknown".to_string()
}

/// Classify a ZIP as primary service area, adjacent, or other.
pub fn classify_service_area(zip: &str) -> ServiceAreaClass {
    let zip = clean_zip(zip);
    if neighborhood_map().contains_key(zip) {
        ServiceAreaClass::Primary
    } else if adjacent_zips().contains(zip) {
        ServiceAreaClass::Adjacent
    } else {
        ServiceAreaClass::Other
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_lookup_beats_city_name() {
        assert_eq!(map_city_to_neighborhood("Columbus", "43081"), "Westerville");
        assert_eq!(map_city_to_neighborhood("", "43016"), "Dublin");
    }

    #[test]
    fn unmapped_zip_falls_back_to_title_cased_city() {
        assert_eq!(map_city_to_neighborhood("GROVE CITY", "99999"), "Grove City");
        assert_eq!(map_city_to_neighborhood("columbus", "99999"), "Columbus");
        assert_eq!(map_city_to_neighborhood("", "99999"), "Unknown");
    }

    #[test]
    fn zip_plus_four_is_truncated_before_lookup() {
        assert_eq!(map_city_to_neighborhood("", "43015-1234"), "Delaware");
        assert_eq!(classify_service_area("43215-0001"), ServiceAreaClass::Adjacent);
    }

    #[test]
    fn service_area_classification() {
        assert_eq!(classify_service_area("43081"), ServiceAreaClass::Primary);
        assert_eq!(classify_service_area("43215"), ServiceAreaClass::Adjacent);
        assert_eq!(classify_service_area("99999"), ServiceAreaClass::Other);
    }
}
