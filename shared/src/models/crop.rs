//! Crop profile table

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Crops with a dedicated spoilage profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    Rice,
    Wheat,
    Maize,
    Potato,
    Onion,
    Mustard,
}

/// Spoilage chemistry family of a crop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CropClass {
    /// Cereal grains that mold when wet
    Grain,
    /// Tubers and bulbs that soft-rot
    Tuber,
    Oilseed,
}

impl CropKind {
    /// Resolve a free-form crop name (English or transliterated Bangla).
    /// Aliases match whole words only. Returns None for crops without a profile.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let words: Vec<&str> = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let mentions = |aliases: &[&str]| words.iter().any(|w| aliases.iter().any(|a| a == w));

        if mentions(&["paddy", "rice", "dhan"]) {
            Some(CropKind::Rice)
        } else if mentions(&["wheat", "gom"]) {
            Some(CropKind::Wheat)
        } else if mentions(&["corn", "maize", "bhutta"]) {
            Some(CropKind::Maize)
        } else if mentions(&["potato", "potatoes", "alu", "aloo"]) {
            Some(CropKind::Potato)
        } else if mentions(&["onion", "onions", "peyaj"]) {
            Some(CropKind::Onion)
        } else if mentions(&["mustard", "sorisha"]) {
            Some(CropKind::Mustard)
        } else {
            None
        }
    }

    pub fn class(&self) -> CropClass {
        match self {
            CropKind::Rice | CropKind::Wheat | CropKind::Maize => CropClass::Grain,
            CropKind::Potato | CropKind::Onion => CropClass::Tuber,
            CropKind::Mustard => CropClass::Oilseed,
        }
    }

    pub fn is_tuber(&self) -> bool {
        self.class() == CropClass::Tuber
    }

    /// Bangla display name
    pub fn name_bn(&self) -> &'static str {
        match self {
            CropKind::Rice => "ধান",
            CropKind::Wheat => "গম",
            CropKind::Maize => "ভুট্টা",
            CropKind::Potato => "আলু",
            CropKind::Onion => "পেঁয়াজ",
            CropKind::Mustard => "সরিষা",
        }
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CropKind::Rice => "Rice",
            CropKind::Wheat => "Wheat",
            CropKind::Maize => "Maize",
            CropKind::Potato => "Potato",
            CropKind::Onion => "Onion",
            CropKind::Mustard => "Mustard",
        };
        write!(f, "{}", name)
    }
}

/// Baseline spoilage behaviour of a crop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CropProfile {
    pub crop: CropKind,
    /// Hours until critical loss under neutral conditions
    pub baseline_hours: Decimal,
    /// Moisture percentage above which decay accelerates
    pub moisture_threshold: Decimal,
    /// Ambient temperature (°C) above which decay accelerates
    pub heat_threshold: Decimal,
    pub heat_sensitive: bool,
}

impl CropProfile {
    /// Moisture assumed when a batch was saved without a reading.
    /// Tubers come out of the ground wet, so the default sits above their threshold.
    pub fn default_moisture(&self) -> Decimal {
        if self.crop.is_tuber() {
            Decimal::from(85)
        } else {
            Decimal::from(20)
        }
    }

    /// Hours lost per percentage point of moisture above the threshold
    pub fn moisture_penalty_rate(&self) -> Decimal {
        if self.crop.is_tuber() {
            Decimal::from(5)
        } else {
            Decimal::from(10)
        }
    }

    /// Hours lost when ambient temperature exceeds the threshold
    pub fn heat_penalty(&self) -> Decimal {
        if self.heat_sensitive {
            Decimal::from(36)
        } else {
            Decimal::from(24)
        }
    }
}

/// Static profile for a known crop
pub fn profile(crop: CropKind) -> CropProfile {
    let (baseline_hours, moisture_threshold, heat_threshold, heat_sensitive) = match crop {
        CropKind::Rice => (120, Decimal::from(14), 30, false),
        CropKind::Wheat => (96, Decimal::new(135, 1), 25, true),
        CropKind::Maize => (72, Decimal::from(15), 30, false),
        CropKind::Potato => (168, Decimal::from(80), 20, true),
        CropKind::Onion => (168, Decimal::from(80), 20, true),
        CropKind::Mustard => (144, Decimal::from(10), 30, false),
    };

    CropProfile {
        crop,
        baseline_hours: Decimal::from(baseline_hours),
        moisture_threshold,
        heat_threshold: Decimal::from(heat_threshold),
        heat_sensitive,
    }
}

/// Look up the profile for a free-form crop type.
/// Unrecognized crops use the Rice profile.
pub fn profile_for(crop_type: &str) -> CropProfile {
    profile(CropKind::from_name(crop_type).unwrap_or(CropKind::Rice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_aliases() {
        assert_eq!(CropKind::from_name("Paddy"), Some(CropKind::Rice));
        assert_eq!(CropKind::from_name("Paddy/Rice"), Some(CropKind::Rice));
        assert_eq!(CropKind::from_name("  WHEAT "), Some(CropKind::Wheat));
        assert_eq!(CropKind::from_name("Corn (Maize)"), Some(CropKind::Maize));
        assert_eq!(CropKind::from_name("Demo Potato"), Some(CropKind::Potato));
        assert_eq!(CropKind::from_name("alu"), Some(CropKind::Potato));
        assert_eq!(CropKind::from_name("Mustard"), Some(CropKind::Mustard));
    }

    #[test]
    fn test_aliases_match_whole_words() {
        assert_eq!(CropKind::from_name("Dhaniya"), None);
        assert_eq!(CropKind::from_name("Aluminium drums"), None);
        assert_eq!(CropKind::from_name("Gomphrena"), None);
        assert_eq!(CropKind::from_name("Potatoes (Diamond)"), Some(CropKind::Potato));
        assert_eq!(profile_for("Dhaniya").crop, CropKind::Rice);
    }

    #[test]
    fn test_unknown_crop_falls_back_to_rice() {
        assert_eq!(profile_for("Jackfruit").crop, CropKind::Rice);
        assert_eq!(profile_for("").crop, CropKind::Rice);
        assert_eq!(profile_for("Jackfruit"), profile(CropKind::Rice));
    }

    #[test]
    fn test_wheat_profile() {
        let wheat = profile_for("Wheat");
        assert_eq!(wheat.baseline_hours, Decimal::from(96));
        assert_eq!(wheat.moisture_threshold, Decimal::new(135, 1));
        assert!(wheat.heat_sensitive);
        assert_eq!(wheat.heat_penalty(), Decimal::from(36));
    }

    #[test]
    fn test_tuber_defaults() {
        let potato = profile_for("Potato");
        assert_eq!(potato.default_moisture(), Decimal::from(85));
        assert_eq!(potato.moisture_penalty_rate(), Decimal::from(5));
        assert!(potato.default_moisture() > potato.moisture_threshold);

        let rice = profile_for("Rice");
        assert_eq!(rice.default_moisture(), Decimal::from(20));
        assert_eq!(rice.moisture_penalty_rate(), Decimal::from(10));
    }
}
