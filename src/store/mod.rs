//! Note repository and tree indexer

mod crawler;
mod repository;

pub use crawler::{
    CrawlError, CrawlResult, DayResult, NoopReporter, ProgressReporter, TreeIndexer,
};
pub use repository::{NoteRepository, SavedNote, StoreError, UserAction};
