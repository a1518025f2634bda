//! State behind the track table: the mined songs, the live filter and the status line.
//!
//! Front ends drive it with direct calls instead of registering callbacks.

use std::{fmt::Display, path::Path};

use chrono::{DateTime, Local};

use crate::{
    domain::track::{Song, TrackMetadata, filter_songs},
    mining::{Miner, tags::TagReader},
    storage::{error::StorageError, operations::Storage},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Completed { found: usize, at: DateTime<Local> },
    Committed { stored: usize, at: DateTime<Local> },
    Error(String),
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "idle"),
            Status::Completed { found, at } => {
                write!(f, "completed at {}: {found} tracks found", at.format("%H:%M:%S"))
            }
            Status::Committed { stored, at } => {
                write!(f, "completed at {}: {stored} tracks stored", at.format("%H:%M:%S"))
            }
            Status::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

pub struct Session<R: TagReader> {
    miner: Miner<R>,
    tracks: Vec<TrackMetadata>,
    songs: Vec<Song>,
    status: Status,
}

impl<R: TagReader> Session<R> {
    pub fn new(miner: Miner<R>) -> Self {
        Self {
            miner,
            tracks: Vec::new(),
            songs: Vec::new(),
            status: Status::Idle,
        }
    }

    /// Mines `dir` and replaces the current list with what was found
    pub fn select_directory(&mut self, dir: &Path) -> &[Song] {
        self.tracks = self.miner.mine(dir);
        self.songs = self.tracks.iter().map(Song::from).collect();
        self.status = Status::Completed {
            found: self.songs.len(),
            at: Local::now(),
        };
        &self.songs
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Songs matching the live query, recomputed on every call
    pub fn filter(&self, query: &str) -> Vec<&Song> {
        filter_songs(&self.songs, query)
    }

    /// Stores the current list, the status line reflects the outcome
    pub fn commit(&mut self, storage: &mut Storage) -> Result<usize, StorageError> {
        match storage.persist_all(&self.tracks) {
            Ok(stored) => {
                self.status = Status::Committed {
                    stored,
                    at: Local::now(),
                };
                Ok(stored)
            }
            Err(err) => {
                self.status = Status::Error(err.to_string());
                Err(err)
            }
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }
}
