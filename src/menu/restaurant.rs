use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The dining venues menus are collected for. Serialized with the label the cooperative
/// uses for them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Restaurant {
    #[serde(rename = "상록원3층식당 - 집밥")]
    Floor3HomeMeal,
    #[serde(rename = "상록원3층식당 - 한그릇(한정판매)")]
    Floor3OneBowl,
    #[serde(rename = "상록원2층식당 - 일품코너")]
    Floor2Special,
    #[serde(rename = "상록원2층식당 - 양식코너")]
    Floor2Western,
    #[serde(rename = "상록원2층식당 - 뚝배기코너")]
    Floor2Ttukbaegi,
    #[serde(rename = "솥앤누들")]
    SotAndNoodle,
    #[serde(rename = "분식당")]
    Snackbar,
    #[serde(rename = "누리터식당")]
    Nuriter,
    #[serde(rename = "남산학사 기숙사 식당")]
    NamsanDormitory,
    #[serde(rename = "경영관 D-flex")]
    BusinessHallDflex,
}

impl Restaurant {
    pub const ALL: [Self; 10] = [
        Self::Floor3HomeMeal,
        Self::Floor3OneBowl,
        Self::Floor2Special,
        Self::Floor2Western,
        Self::Floor2Ttukbaegi,
        Self::SotAndNoodle,
        Self::Snackbar,
        Self::Nuriter,
        Self::NamsanDormitory,
        Self::BusinessHallDflex,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Floor3HomeMeal => "상록원3층식당 - 집밥",
            Self::Floor3OneBowl => "상록원3층식당 - 한그릇(한정판매)",
            Self::Floor2Special => "상록원2층식당 - 일품코너",
            Self::Floor2Western => "상록원2층식당 - 양식코너",
            Self::Floor2Ttukbaegi => "상록원2층식당 - 뚝배기코너",
            Self::SotAndNoodle => "솥앤누들",
            Self::Snackbar => "분식당",
            Self::Nuriter => "누리터식당",
            Self::NamsanDormitory => "남산학사 기숙사 식당",
            Self::BusinessHallDflex => "경영관 D-flex",
        }
    }
}

impl Display for Restaurant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_serde() {
        for restaurant in Restaurant::ALL {
            let serialized = serde_json::to_string(&restaurant).unwrap();
            assert_eq!(serialized, format!("\"{}\"", restaurant.label()));
            let back: Restaurant = serde_json::from_str(&serialized).unwrap();
            assert_eq!(back, restaurant);
        }
    }
}
