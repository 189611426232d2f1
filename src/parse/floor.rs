use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::cell::{CellGrammar, SetMenuRules};
use super::remove_excess_whitespace::remove_all_whitespace;
use crate::menu::Restaurant;

/// A floor of the 상록원 building; each has its own menu page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Floor {
    One,
    Two,
    Three,
}

impl Floor {
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// The `code` query parameter of the floor's mobile menu page.
    pub const fn code(self) -> u8 {
        match self {
            Self::One => 7,
            Self::Two => 1,
            Self::Three => 5,
        }
    }

    pub fn layout(self) -> &'static FloorLayout {
        match self {
            Self::One => &FLOOR_1,
            Self::Two => &FLOOR_2,
            Self::Three => &FLOOR_3,
        }
    }
}

impl Display for Floor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "floor {}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// `corner | menu`: lunch and dinner share one cell and are told apart by hours.
    Combined,
    /// `corner | lunch | dinner`
    Split,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Trimmed,
    WhitespaceRemoved,
}

impl LabelStyle {
    pub fn normalize(self, text: &str) -> String {
        match self {
            Self::Trimmed => text.trim().to_string(),
            Self::WhitespaceRemoved => remove_all_whitespace(text),
        }
    }
}

/// Whether a meal that is not open still produces a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedPolicy {
    Skip,
    Emit,
}

#[derive(Debug)]
pub struct FloorLayout {
    pub floor: Floor,
    pub columns: ColumnLayout,
    pub label_style: LabelStyle,
    /// Corner label on the page to venue. Labels not listed are other corners.
    pub corners: &'static [(&'static str, Restaurant)],
    pub grammar: CellGrammar,
    pub closed_policy: ClosedPolicy,
}

/// First-cell text of the header row.
pub const HEADER_LABEL: &str = "구분";
pub const CLOSURE_KEYWORD: &str = "휴무";

const SET_MENU_NOISE: &[&str] = &["*자율배식*", "배추김치/단무지"];

static FLOOR_1: FloorLayout = FloorLayout {
    floor: Floor::One,
    columns: ColumnLayout::Combined,
    label_style: LabelStyle::Trimmed,
    corners: &[
        ("메뉴1", Restaurant::SotAndNoodle),
        ("메뉴2", Restaurant::Snackbar),
    ],
    grammar: CellGrammar::LineScan {
        noise: &["****분식당****"],
        rewrites: &[("NEW 쌀국수", "쌀국수")],
    },
    closed_policy: ClosedPolicy::Skip,
};

static FLOOR_2: FloorLayout = FloorLayout {
    floor: Floor::Two,
    columns: ColumnLayout::Split,
    label_style: LabelStyle::Trimmed,
    corners: &[
        ("일품", Restaurant::Floor2Special),
        ("양식", Restaurant::Floor2Western),
        ("뚝배기", Restaurant::Floor2Ttukbaegi),
    ],
    grammar: CellGrammar::SetOrItemized(SetMenuRules {
        closure_keyword: None,
        set_noise: SET_MENU_NOISE,
        split_ampersand: false,
    }),
    closed_policy: ClosedPolicy::Skip,
};

static FLOOR_3: FloorLayout = FloorLayout {
    floor: Floor::Three,
    columns: ColumnLayout::Split,
    label_style: LabelStyle::WhitespaceRemoved,
    corners: &[
        ("집밥", Restaurant::Floor3HomeMeal),
        ("한그릇(한정판매)", Restaurant::Floor3OneBowl),
    ],
    grammar: CellGrammar::SetOrItemized(SetMenuRules {
        closure_keyword: Some(CLOSURE_KEYWORD),
        set_noise: &["*자율배식*", "배추김치/단무지", "**12시부터 한정판매"],
        split_ampersand: true,
    }),
    closed_policy: ClosedPolicy::Emit,
};

impl FloorLayout {
    pub fn restaurant_for(&self, label: &str) -> Option<Restaurant> {
        let label = self.label_style.normalize(label);
        self.corners
            .iter()
            .find(|(corner, _)| *corner == label)
            .map(|(_, restaurant)| *restaurant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(Floor::One.code(), 7);
        assert_eq!(Floor::Two.code(), 1);
        assert_eq!(Floor::Three.code(), 5);
    }

    #[test]
    fn test_layouts_belong_to_their_floor() {
        for floor in Floor::ALL {
            assert_eq!(floor.layout().floor, floor);
        }
    }

    #[test]
    fn test_restaurant_for() {
        assert_eq!(
            Floor::Two.layout().restaurant_for(" 양식 "),
            Some(Restaurant::Floor2Western)
        );
        assert_eq!(Floor::Two.layout().restaurant_for("백반"), None);
        assert_eq!(
            Floor::Three.layout().restaurant_for("한그릇\n(한정판매)"),
            Some(Restaurant::Floor3OneBowl)
        );
        assert_eq!(Floor::One.layout().restaurant_for("메뉴3"), None);
    }
}
