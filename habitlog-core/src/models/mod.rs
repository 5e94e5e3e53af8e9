mod day_entry;
mod habit;
mod status;
mod time_slot;

pub use day_entry::DayEntry;
pub use habit::Habit;
pub use status::Status;
pub use time_slot::TimeSlot;
