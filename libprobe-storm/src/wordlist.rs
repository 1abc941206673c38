use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker assumed when a wordlist is given without one.
pub const DEFAULT_MARKER: &str = "WL1";

#[derive(Debug, Error)]
pub enum WordlistError {
    #[error("failed to read wordlist for marker {marker} at {path}: {source}")]
    Read {
        marker: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-marker candidate words, loaded once at startup and immutable for the
/// lifetime of the run.
#[derive(Debug, Clone, Default)]
pub struct WordlistStore {
    lists: HashMap<String, Vec<String>>,
}

impl WordlistStore {
    pub fn load(sources: &HashMap<String, PathBuf>) -> Result<Self, WordlistError> {
        let mut lists = HashMap::with_capacity(sources.len());
        for (marker, path) in sources {
            let words = read_words(path).map_err(|source| WordlistError::Read {
                marker: marker.clone(),
                path: path.clone(),
                source,
            })?;
            lists.insert(marker.clone(), words);
        }
        Ok(Self { lists })
    }

    pub fn from_lists(lists: HashMap<String, Vec<String>>) -> Self {
        Self { lists }
    }

    pub fn words(&self, marker: &str) -> Option<&[String]> {
        self.lists.get(marker).map(Vec::as_slice)
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Whether any loaded marker occurs as a literal substring of `template`.
    pub fn matches(&self, template: &str) -> bool {
        self.lists.keys().any(|marker| template.contains(marker))
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

fn read_words(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut words = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            words.push(trimmed.to_string());
        }
    }
    Ok(words)
}
