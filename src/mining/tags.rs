//! Reading embedded tags from media files

use std::path::Path;

use lofty::error::LoftyError;
use lofty::prelude::{Accessor, ItemKey, TaggedFileExt};
use lofty::tag::Tag;
use thiserror::Error;

use crate::domain::track::RawTagData;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tag error: {0}")]
    Lofty(#[from] LoftyError),
}

/// Capability to read raw tags from a file
pub trait TagReader {
    fn read(&self, path: &Path) -> Result<RawTagData, TagError>;
}

/// [`TagReader`] backed by lofty, handles mp3 and flac among others
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagReader;

impl TagReader for LoftyTagReader {
    fn read(&self, path: &Path) -> Result<RawTagData, TagError> {
        let tagged_file = lofty::read_from_path(path)?;

        // a file without tags is valid, it just has nothing to say
        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(RawTagData::default());
        };

        Ok(raw_from_tag(tag))
    }
}

fn raw_from_tag(tag: &Tag) -> RawTagData {
    RawTagData {
        title: tag.title().map(|v| v.to_string()),
        performers: tag
            .get_strings(&ItemKey::TrackArtist)
            .map(str::to_string)
            .collect(),
        album: tag.album().map(|v| v.to_string()),
        year: tag.year(),
        genres: tag.get_strings(&ItemKey::Genre).map(str::to_string).collect(),
        track_number: tag.track(),
    }
}

/// Reads tags of `path`, reporting failures to the log instead of the caller
pub fn read_tags<R: TagReader + ?Sized>(reader: &R, path: &Path) -> Option<RawTagData> {
    match reader.read(path) {
        Ok(raw) => Some(raw),
        Err(err) => {
            log::warn!("failed to read tags of {}: {err}", path.to_string_lossy());
            None
        }
    }
}
