mod cell;
mod error;
mod floor;
mod markup;
mod remove_excess_whitespace;
mod service_period;
pub mod statics;
mod table;
mod text_from_selection;
mod weekly;

pub use cell::{CellOutcome, NO_MENU_NOTE};
pub use error::{Error, Result};
pub use floor::Floor;
pub use remove_excess_whitespace::remove_excess_whitespace;
pub use table::{locate_menu_table, parse_table};
pub use weekly::{locate_weekly_table, parse_weekly_table};
