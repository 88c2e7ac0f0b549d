//! Append-only JSON-lines journal backing a [`ResourceActor`](crate::actor_framework::ResourceActor).
//!
//! Each line is the full serialized entity after a mutation. Replay keeps the
//! last line per id and compacts the file when it carries history, so it only
//! grows between restarts.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::actor_framework::{Entity, FrameworkError, Journal};

pub struct JsonLinesJournal {
    path: PathBuf,
    file: Option<File>,
}

impl JsonLinesJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), file: None }
    }

    /// Journal file `<dir>/<kind>.jsonl` for entity kind `T`.
    pub fn for_entity<T: Entity>(dir: &Path) -> Self {
        Self::new(dir.join(format!("{}.jsonl", T::KIND)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file with exactly `items`, one line each. The new content
    /// is written to a sibling file and renamed over the old one.
    fn compact<T: Serialize>(&mut self, items: &[T]) -> Result<(), FrameworkError> {
        let mut content = Vec::new();
        for item in items {
            serde_json::to_writer(&mut content, item).map_err(persistence)?;
            content.push(b'\n');
        }

        let staging = self.path.with_extension("jsonl.compact");
        let mut file = File::create(&staging).map_err(persistence)?;
        file.write_all(&content).map_err(persistence)?;
        file.sync_all().map_err(persistence)?;
        std::fs::rename(&staging, &self.path).map_err(persistence)?;

        self.file = None;
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut File, FrameworkError> {
        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent).map_err(persistence)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(persistence)?;
            self.file = Some(file);
        }
        self.file
            .as_mut()
            .ok_or_else(|| FrameworkError::Persistence("journal file not open".to_string()))
    }
}

impl<T> Journal<T> for JsonLinesJournal
where
    T: Entity + Serialize + DeserializeOwned,
{
    /// Replays the file. When it holds superseded records, unreadable lines
    /// or an unterminated tail, it is rewritten with one line per id before
    /// any further append.
    fn load(&mut self) -> Result<Vec<T>, FrameworkError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence(e)),
        };

        let mut items: Vec<T> = Vec::new();
        let mut positions: HashMap<T::Id, usize> = HashMap::new();
        let mut records = 0usize;
        let mut dirty = false;

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(persistence)? == 0 {
                break;
            }
            line_no += 1;
            if buf.last() != Some(&b'\n') {
                dirty = true;
            }
            let line = String::from_utf8_lossy(&buf);
            if line.trim().is_empty() {
                continue;
            }
            let item: T = match serde_json::from_str(line.trim_end()) {
                Ok(item) => item,
                Err(e) => {
                    // Usually a torn final write.
                    warn!(path = %self.path.display(), line = line_no, error = %e, "Skipping unreadable journal line");
                    dirty = true;
                    continue;
                }
            };
            records += 1;
            match positions.get(item.id()) {
                Some(&pos) => items[pos] = item,
                None => {
                    positions.insert(item.id().clone(), items.len());
                    items.push(item);
                }
            }
        }

        if dirty || records > items.len() {
            self.compact(&items)?;
            info!(path = %self.path.display(), records, kept = items.len(), "Journal compacted");
        }

        debug!(path = %self.path.display(), count = items.len(), "Journal loaded");
        Ok(items)
    }

    fn append(&mut self, item: &T) -> Result<(), FrameworkError> {
        let mut line = serde_json::to_vec(item).map_err(persistence)?;
        line.push(b'\n');
        let file = self.writer()?;
        file.write_all(&line).map_err(persistence)?;
        file.flush().map_err(persistence)?;
        Ok(())
    }
}

fn persistence(e: impl std::fmt::Display) -> FrameworkError {
    FrameworkError::Persistence(e.to_string())
}
