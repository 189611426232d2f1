use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{day::DayOfWeek, menu_item::MenuItem, restaurant::Restaurant};
use crate::parse::CellOutcome;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        })
    }
}

/// `Closed` is a scheduled day off; `Unavailable` means the cell was found but no menu
/// could be read out of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Closed,
    Unavailable,
}

/// What one venue serves for one meal of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    restaurant: Restaurant,
    day: DayOfWeek,
    meal_type: MealType,
    items: Option<Vec<MenuItem>>,
    status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    updated_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(
        restaurant: Restaurant,
        day: DayOfWeek,
        meal_type: MealType,
        outcome: CellOutcome,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let (items, status, notes) = match outcome {
            CellOutcome::Open(items) if !items.is_empty() => (Some(items), Status::Open, None),
            CellOutcome::Open(_) => (None, Status::Unavailable, None),
            CellOutcome::Closed { notes } => (None, Status::Closed, notes),
            CellOutcome::Unavailable { notes } => (None, Status::Unavailable, notes),
        };
        Self {
            restaurant,
            day,
            meal_type,
            items,
            status,
            notes,
            updated_at,
        }
    }

    pub const fn restaurant(&self) -> Restaurant {
        self.restaurant
    }

    pub const fn day(&self) -> DayOfWeek {
        self.day
    }

    pub const fn meal_type(&self) -> MealType {
        self.meal_type
    }

    pub fn items(&self) -> Option<&[MenuItem]> {
        self.items.as_deref()
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
