//! Core types: DateKey, DayNote, Attachment, NotesIndex

mod date_key;
mod day_note;
mod notes_index;

pub use date_key::{DateKey, ParseDateKeyError};
pub use day_note::{Attachment, DayNote};
pub use notes_index::{NotesIndex, sorted_descending};
