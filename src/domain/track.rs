use std::path::PathBuf;

use serde::Serialize;

/// Value used for every string field that has no usable tag
pub const UNKNOWN: &str = "Unknown";

/// Tags as read from a media file, before any defaults are applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTagData {
    pub title: Option<String>,
    pub performers: Vec<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub genres: Vec<String>,
    pub track_number: Option<u32>,
}

/// Canonical record of one mined file.
///
/// String fields are never empty, numeric fields use 0 for "unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub performer: String,
    pub album_name: String,
    /// path of the source file, used as the album location key
    pub album_path: String,
    pub year: u32,
    pub genre: String,
    pub track_number: u32,
    pub group_name: String,
}

/// Row shown in a track table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: u32,
    pub genre: String,
    pub track_number: u32,
    pub path: PathBuf,
}

impl Song {
    /// Case-insensitive substring match against title, artist and album.
    /// `needle` must already be lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.artist, &self.album]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl From<&TrackMetadata> for Song {
    fn from(track: &TrackMetadata) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.performer.clone(),
            album: track.album_name.clone(),
            year: track.year,
            genre: track.genre.clone(),
            track_number: track.track_number,
            path: PathBuf::from(&track.album_path),
        }
    }
}

/// Returns the songs whose title, artist or album contains `query`, ignoring case.
/// A blank query keeps everything.
pub fn filter_songs<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return songs.iter().collect();
    }
    songs
        .iter()
        .filter(|song| song.matches_lowercase(&needle))
        .collect()
}
