use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Hotel {
    #[serde(rename = "EDEN Hotel")]
    EdenHotel,
    #[serde(rename = "Thaala Hotel")]
    ThaalaHotel,
}

impl Hotel {
    pub const ALL: [Hotel; 2] = [Hotel::EdenHotel, Hotel::ThaalaHotel];

    pub fn as_str(self) -> &'static str {
        match self {
            Hotel::EdenHotel => "EDEN Hotel",
            Hotel::ThaalaHotel => "Thaala Hotel",
        }
    }
}

impl fmt::Display for Hotel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hotel {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "eden hotel" | "eden" => Ok(Hotel::EdenHotel),
            "thaala hotel" | "thaala" => Ok(Hotel::ThaalaHotel),
            _ => bail!("Unknown hotel: {raw}. Supported: EDEN Hotel, Thaala Hotel"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(rename = "Suite/Room")]
    SuiteRoom,
    #[serde(rename = "Restaurant & Bar")]
    RestaurantBar,
    #[serde(rename = "Lobby")]
    Lobby,
    #[serde(rename = "Function Venue")]
    FunctionVenue,
    #[serde(rename = "Outdoor")]
    Outdoor,
    #[serde(rename = "Gym")]
    Gym,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::SuiteRoom,
        Category::RestaurantBar,
        Category::Lobby,
        Category::FunctionVenue,
        Category::Outdoor,
        Category::Gym,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::SuiteRoom => "Suite/Room",
            Category::RestaurantBar => "Restaurant & Bar",
            Category::Lobby => "Lobby",
            Category::FunctionVenue => "Function Venue",
            Category::Outdoor => "Outdoor",
            Category::Gym => "Gym",
            Category::Other => "Other",
        }
    }

    /// Lenient mapping used for tables that were edited by hand: anything
    /// unrecognised lands in `Other`.
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "suite/room" | "suite" | "room" => Ok(Category::SuiteRoom),
            "restaurant & bar" | "restaurant" | "bar" => Ok(Category::RestaurantBar),
            "lobby" => Ok(Category::Lobby),
            "function venue" | "function" => Ok(Category::FunctionVenue),
            "outdoor" => Ok(Category::Outdoor),
            "gym" => Ok(Category::Gym),
            "other" => Ok(Category::Other),
            _ => bail!(
                "Unknown category: {raw}. Supported: {}",
                Category::ALL
                    .iter()
                    .map(|category| category.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

/// A proposed record, before the ledger stamps it with a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub hotel_name: Hotel,
    pub area_name: String,
    pub category: Category,
    pub coverage_sqm: f64,
    #[serde(default)]
    pub cost_per_sqm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub date_added: NaiveDate,
    pub hotel_name: Hotel,
    pub area_name: String,
    pub category: Category,
    pub coverage_sqm: f64,
    #[serde(default)]
    pub cost_per_sqm: Option<f64>,
}

impl AssessmentRecord {
    pub fn from_entry(entry: NewEntry, date_added: NaiveDate) -> Self {
        Self {
            date_added,
            hotel_name: entry.hotel_name,
            area_name: entry.area_name,
            category: entry.category,
            coverage_sqm: entry.coverage_sqm,
            cost_per_sqm: entry.cost_per_sqm,
        }
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.cost_per_sqm.map(|unit| self.coverage_sqm * unit)
    }
}

/// Input state for one quick-entry form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub hotel_name: Option<Hotel>,
    pub area_name: String,
    pub category: Category,
    pub coverage_sqm: Option<f64>,
    pub cost_per_sqm: Option<f64>,
}

impl EntryForm {
    pub fn to_entry(&self) -> NewEntry {
        NewEntry {
            hotel_name: self.hotel_name.unwrap_or(Hotel::EdenHotel),
            area_name: self.area_name.clone(),
            category: self.category,
            coverage_sqm: self.coverage_sqm.unwrap_or_default(),
            cost_per_sqm: self.cost_per_sqm,
        }
    }

    /// Hotel stays selected; per-entry fields are blanked so nothing from the
    /// previous row leaks into the next one.
    pub fn clear_after_submit(&mut self, last_category: Category) {
        self.area_name.clear();
        self.coverage_sqm = None;
        self.cost_per_sqm = None;
        self.category = last_category;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotel_parses_display_names_case_insensitively() {
        assert_eq!("EDEN Hotel".parse::<Hotel>().unwrap(), Hotel::EdenHotel);
        assert_eq!("thaala hotel".parse::<Hotel>().unwrap(), Hotel::ThaalaHotel);
        assert!("Grand Hotel".parse::<Hotel>().is_err());
    }

    #[test]
    fn unknown_category_coerces_to_other() {
        assert_eq!(Category::coerce("Restaurant & Bar"), Category::RestaurantBar);
        assert_eq!(Category::coerce("Spa"), Category::Other);
    }

    #[test]
    fn total_cost_follows_inputs() {
        let mut record = AssessmentRecord {
            date_added: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            hotel_name: Hotel::EdenHotel,
            area_name: "Lobby".to_string(),
            category: Category::Lobby,
            coverage_sqm: 10.0,
            cost_per_sqm: Some(2.5),
        };
        assert_eq!(record.total_cost(), Some(25.0));

        record.coverage_sqm = 20.0;
        assert_eq!(record.total_cost(), Some(50.0));

        record.cost_per_sqm = None;
        assert_eq!(record.total_cost(), None);
    }

    #[test]
    fn clear_after_submit_blanks_entry_fields() {
        let mut form = EntryForm {
            hotel_name: Some(Hotel::ThaalaHotel),
            area_name: "Pool Deck".to_string(),
            category: Category::Outdoor,
            coverage_sqm: Some(120.0),
            cost_per_sqm: Some(3.0),
        };

        form.clear_after_submit(Category::Outdoor);

        assert_eq!(form.hotel_name, Some(Hotel::ThaalaHotel));
        assert!(form.area_name.is_empty());
        assert_eq!(form.coverage_sqm, None);
        assert_eq!(form.cost_per_sqm, None);
        assert_eq!(form.category, Category::Outdoor);
    }
}
