mod day;
mod meal;
mod menu_item;
mod money;
mod restaurant;

pub use day::{date_of_sday, korean_date, sday_of, DayOfWeek};
pub use meal::{Meal, MealType, Status};
pub use menu_item::MenuItem;
pub use money::Won;
pub use restaurant::Restaurant;
