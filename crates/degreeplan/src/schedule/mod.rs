//! Weekly class grid: schedule entries, their layout, and the editor's
//! time choices.

mod layout;
mod options;
mod selection;
mod types;

pub use layout::{layout_week, Block, DayColumn, GridConfig, WeekLayout};
pub use options::{end_time_options, is_valid_end, time_options};
pub use selection::Selection;
pub use types::*;
