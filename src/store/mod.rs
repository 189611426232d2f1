mod local;

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::menu::{DayOfWeek, Meal, Restaurant};

pub use local::FileStore;

/// Everything one scheduled pass produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSnapshot {
    fetched_at: DateTime<Utc>,
    date: NaiveDate,
    day: DayOfWeek,
    meals: Vec<Meal>,
    /// The whole week from the weekly page, when it was scraped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    week: Vec<Meal>,
}

impl MenuSnapshot {
    pub fn new(date: NaiveDate, meals: Vec<Meal>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            date,
            day: DayOfWeek::of(date),
            meals,
            week: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_week(mut self, week: Vec<Meal>) -> Self {
        self.week = week;
        self
    }

    #[inline]
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    #[must_use]
    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    #[inline]
    #[must_use]
    pub fn week(&self) -> &[Meal] {
        &self.week
    }

    /// Record count per restaurant, in `Restaurant::ALL` order, skipping restaurants
    /// without records.
    pub fn summary(&self) -> Vec<(Restaurant, usize)> {
        Restaurant::ALL
            .iter()
            .map(|restaurant| {
                let count = self
                    .meals
                    .iter()
                    .filter(|meal| meal.restaurant() == *restaurant)
                    .count();
                (*restaurant, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn time_since_refresh(&self) -> Duration {
        Utc::now().signed_duration_since(self.fetched_at)
    }

    #[inline]
    #[must_use]
    pub fn time_until_refresh(&self, interval: Duration) -> Duration {
        interval - self.time_since_refresh()
    }

    #[inline]
    #[must_use]
    pub fn needs_refresh(&self, interval: Duration) -> bool {
        self.time_since_refresh() > interval
    }
}

/// Where snapshots go.
#[derive(Debug)]
#[non_exhaustive]
pub enum Store {
    Stdout,
    File(FileStore),
}

impl Store {
    pub fn new(output: Option<impl AsRef<Path>>) -> Self {
        output.map_or(Self::Stdout, |p| Self::File(FileStore::open(p)))
    }

    /// The last saved snapshot. Stdout keeps nothing.
    pub async fn load(&self) -> crate::Result<Option<MenuSnapshot>> {
        match self {
            Self::Stdout => Ok(None),
            Self::File(f) => f.load().await,
        }
    }

    pub async fn save(&self, snapshot: &MenuSnapshot) -> crate::Result<()> {
        match self {
            Self::Stdout => {
                println!("{}", serde_json::to_string_pretty(snapshot)?);
                Ok(())
            }
            Self::File(f) => f.save(snapshot).await,
        }
    }
}
