use serde::{Deserialize, Serialize};

use super::money::Won;

/// One dish, or one set meal listed as its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<Won>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    open_and_close_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl MenuItem {
    /// Returns `None` when there is no name to give the item.
    pub fn new(name: Vec<String>) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            price: None,
            open_and_close_time: None,
            notes: None,
        })
    }

    pub fn single(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Self::new(vec![name])
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: Option<Won>) -> Self {
        self.price = price;
        self
    }

    #[must_use]
    pub fn with_hours(mut self, hours: Option<String>) -> Self {
        self.open_and_close_time = hours;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn name(&self) -> &[String] {
        &self.name
    }

    pub const fn price(&self) -> Option<Won> {
        self.price
    }

    pub fn open_and_close_time(&self) -> Option<&str> {
        self.open_and_close_time.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
