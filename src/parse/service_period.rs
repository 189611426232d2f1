use bitflags::bitflags;

use crate::menu::MealType;
use crate::static_regex;

bitflags! {
    /// The meal periods an item is served in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ServicePeriods: u8 {
        const LUNCH = 1;
        const DINNER = 1 << 1;
        const BOTH = Self::LUNCH.bits() | Self::DINNER.bits();
    }
}

/// Service starting before this hour counts as lunch, ending at or after it as dinner.
pub const DINNER_CUTOFF_HOUR: u32 = 15;

impl ServicePeriods {
    /// Classifies an `HH:MM~HH:MM` operating-hours string. Anything missing or malformed
    /// is served in both periods so no item is dropped.
    pub fn from_hours(hours: Option<&str>) -> Self {
        static_regex!(HOURS <- r"^(\d{2}):\d{2}~(\d{2}):\d{2}$");
        let Some(captures) = hours.and_then(|h| HOURS.captures(h)) else {
            return Self::BOTH;
        };
        let (Ok(start), Ok(end)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>())
        else {
            return Self::BOTH;
        };
        let mut periods = Self::empty();
        periods.set(Self::LUNCH, start < DINNER_CUTOFF_HOUR);
        periods.set(Self::DINNER, end >= DINNER_CUTOFF_HOUR);
        if periods.is_empty() {
            Self::BOTH
        } else {
            periods
        }
    }

    pub fn serves(self, meal_type: MealType) -> bool {
        match meal_type {
            MealType::Lunch => self.contains(Self::LUNCH),
            MealType::Dinner => self.contains(Self::DINNER),
            MealType::Breakfast => false,
        }
    }
}
