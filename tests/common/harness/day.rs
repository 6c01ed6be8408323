//! Builder for day directories written straight to disk.

#![allow(dead_code)]

/// A day's note and the files stored next to it.
#[derive(Debug, Clone)]
pub struct TestDay {
    date: String,
    content: String,
    files: Vec<(String, Vec<u8>)>,
}

impl TestDay {
    /// Starts a day for `YYYY-MM-DD` with empty content.
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            content: String::new(),
            files: Vec::new(),
        }
    }

    /// Sets the stored (portable) markup.
    pub fn content(mut self, markup: &str) -> Self {
        self.content = markup.to_string();
        self
    }

    /// Adds a file to the day directory.
    pub fn file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.files.push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn get_content(&self) -> &str {
        &self.content
    }

    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }
}
