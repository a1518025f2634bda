use std::path::Path;

use crate::domain::track::{RawTagData, TrackMetadata, UNKNOWN};

/// Turns raw tags into a [`TrackMetadata`] with every field filled in.
///
/// Missing or blank strings become "Unknown", missing or zero numbers become 0.
/// The group name is the performer; tags carry no band membership.
pub fn normalize(raw: &RawTagData, source_path: &Path) -> TrackMetadata {
    let performer = text_or_unknown(raw.performers.iter().find(|p| !p.trim().is_empty()));

    TrackMetadata {
        title: text_or_unknown(raw.title.as_ref()),
        group_name: performer.clone(),
        performer,
        album_name: text_or_unknown(raw.album.as_ref()),
        album_path: source_path.to_string_lossy().into_owned(),
        year: positive_or_zero(raw.year),
        genre: text_or_unknown(raw.genres.iter().find(|g| !g.trim().is_empty())),
        track_number: positive_or_zero(raw.track_number),
    }
}

fn text_or_unknown(value: Option<&String>) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn positive_or_zero(value: Option<u32>) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(0)
}
