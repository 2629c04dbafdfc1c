// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending-mutation queue persisted across restarts.
//!
//! Uses JSONL format for durability - each queued mutation is written as a
//! single line and fsynced immediately. Appends and rewrites take an advisory
//! lock on a sibling `.lock` file, so a second process appending while a sync
//! pass rewrites the file never loses an entry.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use sy_core::{QueueItem, RecordId};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Ordered, durable list of mutations awaiting replay.
pub struct SyncQueue {
    /// Path to the queue file.
    path: PathBuf,
    /// Advisory lock guarding appends and rewrites.
    lock_path: PathBuf,
    /// Advisory lock held for the duration of a sync pass.
    drain_lock_path: PathBuf,
}

impl SyncQueue {
    /// Create or open a queue at the given path.
    pub fn open(path: &Path) -> QueueResult<Self> {
        OpenOptions::new().create(true).append(true).open(path)?;

        Ok(SyncQueue {
            path: path.to_path_buf(),
            lock_path: path.with_extension("lock"),
            drain_lock_path: path.with_extension("drain.lock"),
        })
    }

    fn lock(&self) -> QueueResult<File> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        file.lock_exclusive()?;
        Ok(file)
    }

    /// Try to claim the right to run a sync pass.
    ///
    /// Returns `None` if another pass, possibly in another process, holds it.
    /// The claim lasts until the returned file is dropped.
    pub fn try_claim_drain(&self) -> QueueResult<Option<File>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.drain_lock_path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(file)),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Append a mutation to the end of the queue.
    ///
    /// The entry is on disk before this returns.
    pub fn enqueue(&mut self, item: &QueueItem) -> QueueResult<()> {
        let _lock = self.lock()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(item)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;

        Ok(())
    }

    /// Read all queued mutations in order without removing them.
    pub fn peek_all(&self) -> QueueResult<Vec<QueueItem>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut items = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            items.push(serde_json::from_str(&line)?);
        }

        Ok(items)
    }

    /// Get the number of queued mutations.
    pub fn len(&self) -> QueueResult<usize> {
        Ok(self.peek_all()?.len())
    }

    /// Finish a sync pass.
    ///
    /// The first `consumed` entries (the snapshot the pass worked from) are
    /// replaced by `successor`. Entries appended after the snapshot was taken
    /// are kept behind it, in order, with temporary product ids found in
    /// `reconciled` rewritten to their server ids.
    pub fn commit_pass(
        &mut self,
        consumed: usize,
        successor: &[QueueItem],
        reconciled: &HashMap<RecordId, RecordId>,
    ) -> QueueResult<()> {
        let _lock = self.lock()?;
        let appended: Vec<QueueItem> = self
            .peek_all()?
            .into_iter()
            .skip(consumed)
            .map(|item| {
                let target = item
                    .mutation
                    .pending_reference()
                    .and_then(|temp| reconciled.get(&temp).map(|real| (temp, *real)));
                match target {
                    Some((temp, real)) => item.remap_product(temp, real),
                    None => item,
                }
            })
            .collect();
        self.rewrite(successor.iter().chain(&appended))
    }

    fn rewrite<'a>(&self, items: impl Iterator<Item = &'a QueueItem>) -> QueueResult<()> {
        let tmp_path = self.path.with_extension("jsonl.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(&file);
            for item in items {
                serde_json::to_writer(&mut writer, item)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            drop(writer);
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

/// Rules for dropping queued mutations that will never succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Entries older than this are discarded.
    pub max_age: Duration,
    /// Entries that have failed this many times are discarded.
    pub max_attempts: u32,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        EvictionPolicy {
            max_age: Duration::days(15),
            max_attempts: 5,
        }
    }
}

/// Result of applying an [`EvictionPolicy`] to a queue snapshot.
#[derive(Debug, Default)]
pub struct Eviction {
    pub kept: Vec<QueueItem>,
    pub evicted: Vec<QueueItem>,
}

impl EvictionPolicy {
    pub fn is_evicted(&self, item: &QueueItem, now: DateTime<Utc>) -> bool {
        item.age(now) > self.max_age || item.attempts >= self.max_attempts
    }

    /// Split `items` into the ones to replay and the ones to discard,
    /// preserving order within each.
    pub fn evict(&self, items: Vec<QueueItem>, now: DateTime<Utc>) -> Eviction {
        let (evicted, kept) = items
            .into_iter()
            .partition(|item| self.is_evicted(item, now));
        Eviction { kept, evicted }
    }
}
