use std::path::PathBuf;

use crate::{
    config::{self, PersistMode},
    domain::track::{Song, TrackMetadata, UNKNOWN},
    storage::{
        db,
        error::StorageError,
        schema::{UNKNOWN_PERFORMER_TYPE, columns, tables},
    },
};

use columns::*;
use rusqlite::{Connection, OptionalExtension, params};
use tables::*;

/// Foreign key written by [`PersistMode::Append`] for the performer and album of every rola,
/// and for the type of every performer. It is not looked up.
pub const PLACEHOLDER_ID: i64 = 1;

/// Row ids touched by persisting one track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedIds {
    pub album: i64,
    pub rola: i64,
    pub performer: i64,
    pub person: i64,
    pub group: i64,
}

/// Album as shown when browsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumEntry {
    pub id: i64,
    pub path: PathBuf,
    pub name: String,
    pub year: u32,
    pub tracks: usize,
}

/// Main structure that implements all storage logic
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
    mode: PersistMode,
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db: rusqlite::Connection = db::open(db_config)?;
        Ok(Self::from_existing_conn(db, db_config.persist_mode))
    }

    /// wraps a connection whose schema is already initialized
    pub fn from_existing_conn(db: rusqlite::Connection, mode: PersistMode) -> Self {
        Self { db, mode }
    }

    /// Writes one mined track into the schema.
    ///
    /// In append mode this inserts album, rola, performer, person and group rows in that order,
    /// unconditionally. In resolve mode each of them is reused when a row with the same
    /// natural key already exists.
    pub fn persist(&mut self, track: &TrackMetadata) -> Result<PersistedIds, StorageError> {
        Ok(persist_track(&self.db, self.mode, track)?)
    }

    /// Persists a whole mining pass in one transaction.
    /// The first failure rolls everything back and is returned.
    pub fn persist_all(&mut self, tracks: &[TrackMetadata]) -> Result<usize, StorageError> {
        let tx = self.db.transaction()?;
        for track in tracks {
            persist_track(&tx, self.mode, track)?;
        }
        tx.commit()?;

        log::info!("persisted {} tracks ({:?} mode)", tracks.len(), self.mode);
        Ok(tracks.len())
    }

    /// Number of rows in every table of the schema
    pub fn table_counts(&self) -> Result<Vec<(&'static str, usize)>, StorageError> {
        ALL_TABLES
            .iter()
            .map(|table| -> Result<(&'static str, usize), StorageError> {
                let rows: i64 =
                    self.db
                        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                            row.get(0)
                        })?;
                Ok((*table, usize::try_from(rows).unwrap_or(0)))
            })
            .collect()
    }

    /// All stored rolas with their album and performer names
    pub fn list_songs(&self) -> Result<Vec<Song>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "{}
             ORDER BY r.{ID_ROLA}",
            song_select()
        ))?;
        let songs = stmt
            .query_map([], song_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    pub fn list_albums(&self) -> Result<Vec<AlbumEntry>, StorageError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT a.{ID_ALBUM}, a.{PATH}, a.{NAME}, a.{YEAR}, COUNT(r.{ID_ROLA})
             FROM {ALBUMS} a
             LEFT JOIN {ROLAS} r ON r.{ID_ALBUM} = a.{ID_ALBUM}
             GROUP BY a.{ID_ALBUM}
             ORDER BY a.{NAME}, a.{ID_ALBUM}"
        ))?;

        let albums = stmt
            .query_map([], |row| {
                let path: String = row.get(1)?;
                let tracks: i64 = row.get(4)?;
                Ok(AlbumEntry {
                    id: row.get(0)?,
                    path: path.into(),
                    name: row.get(2)?,
                    year: row.get(3)?,
                    tracks: usize::try_from(tracks).unwrap_or(0),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(albums)
    }

    /// Rolas of one album, by track number then title
    pub fn album_songs(&self, album_id: i64) -> Result<Vec<Song>, StorageError> {
        let exists = find_id(&self.db, ALBUMS, ID_ALBUM, ID_ALBUM, &album_id)?.is_some();
        if !exists {
            return Err(StorageError::AlbumNotFound(album_id));
        }

        let mut stmt = self.db.prepare(&format!(
            "{}
             WHERE r.{ID_ALBUM} = ?1
             ORDER BY r.{TRACK}, r.{TITLE}",
            song_select()
        ))?;
        let songs = stmt
            .query_map(params![album_id], song_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }
}

/// Columns read by [`song_from_row`], rolas aliased `r`, performers `p`, albums `a`
fn song_select() -> String {
    format!(
        "SELECT r.{TITLE}, p.{NAME}, a.{NAME}, r.{YEAR}, r.{GENRE}, r.{TRACK}, r.{PATH}
         FROM {ROLAS} r
         LEFT JOIN {PERFORMERS} p ON p.{ID_PERFORMER} = r.{ID_PERFORMER}
         LEFT JOIN {ALBUMS} a ON a.{ID_ALBUM} = r.{ID_ALBUM}"
    )
}

fn song_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Song> {
    let artist: Option<String> = row.get(1)?;
    let album: Option<String> = row.get(2)?;
    let path: String = row.get(6)?;
    Ok(Song {
        title: row.get(0)?,
        artist: artist.unwrap_or_else(|| UNKNOWN.to_string()),
        album: album.unwrap_or_else(|| UNKNOWN.to_string()),
        year: row.get(3)?,
        genre: row.get(4)?,
        track_number: row.get(5)?,
        path: path.into(),
    })
}

fn persist_track(
    conn: &Connection,
    mode: PersistMode,
    track: &TrackMetadata,
) -> Result<PersistedIds, rusqlite::Error> {
    match mode {
        PersistMode::Append => append_track(conn, track),
        PersistMode::Resolve => resolve_track(conn, track),
    }
}

fn append_track(conn: &Connection, track: &TrackMetadata) -> Result<PersistedIds, rusqlite::Error> {
    let album = insert_album(conn, track)?;
    let rola = insert_rola(conn, PLACEHOLDER_ID, PLACEHOLDER_ID, track)?;
    let performer = insert_performer(conn, PLACEHOLDER_ID, &track.performer)?;
    let person = insert_person(conn, &track.performer)?;
    let group = insert_group(conn, &track.group_name)?;

    Ok(PersistedIds {
        album,
        rola,
        performer,
        person,
        group,
    })
}

fn resolve_track(conn: &Connection, track: &TrackMetadata) -> Result<PersistedIds, rusqlite::Error> {
    let album = match find_id(conn, ALBUMS, ID_ALBUM, PATH, &track.album_path)? {
        Some(id) => id,
        None => insert_album(conn, track)?,
    };

    // tags cannot tell a solo artist from a band
    let performer = match find_id(conn, PERFORMERS, ID_PERFORMER, NAME, &track.performer)? {
        Some(id) => id,
        None => insert_performer(conn, UNKNOWN_PERFORMER_TYPE, &track.performer)?,
    };

    let rola = match find_id(conn, ROLAS, ID_ROLA, PATH, &track.album_path)? {
        Some(id) => id,
        None => insert_rola(conn, performer, album, track)?,
    };

    let person = match find_id(conn, PERSONS, ID_PERSON, STAGE_NAME, &track.performer)? {
        Some(id) => id,
        None => insert_person(conn, &track.performer)?,
    };

    let group = match find_id(conn, GROUPS, ID_GROUP, NAME, &track.group_name)? {
        Some(id) => id,
        None => insert_group(conn, &track.group_name)?,
    };

    Ok(PersistedIds {
        album,
        rola,
        performer,
        person,
        group,
    })
}

/// Lowest id of the row in `table` whose `key_col` equals `key`
fn find_id(
    conn: &Connection,
    table: &str,
    id_col: &str,
    key_col: &str,
    key: &dyn rusqlite::ToSql,
) -> Result<Option<i64>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {id_col} FROM {table} WHERE {key_col} = ?1 ORDER BY {id_col} LIMIT 1"),
        params![key],
        |row| row.get(0),
    )
    .optional()
}

fn insert_album(conn: &Connection, track: &TrackMetadata) -> Result<i64, rusqlite::Error> {
    conn.execute(
        &format!("INSERT INTO {ALBUMS} ({PATH}, {NAME}, {YEAR}) VALUES (?1, ?2, ?3)"),
        params![track.album_path, track.album_name, track.year],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_rola(
    conn: &Connection,
    performer_id: i64,
    album_id: i64,
    track: &TrackMetadata,
) -> Result<i64, rusqlite::Error> {
    conn.execute(
        &format!(
            "INSERT INTO {ROLAS} ({ID_PERFORMER}, {ID_ALBUM}, {PATH}, {TITLE}, {TRACK}, {YEAR}, {GENRE})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ),
        params![
            performer_id,
            album_id,
            track.album_path,
            track.title,
            track.track_number,
            track.year,
            track.genre
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_performer(conn: &Connection, type_id: i64, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        &format!("INSERT INTO {PERFORMERS} ({ID_TYPE}, {NAME}) VALUES (?1, ?2)"),
        params![type_id, name],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_person(conn: &Connection, stage_name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        &format!(
            "INSERT INTO {PERSONS} ({STAGE_NAME}, {REAL_NAME}, {BIRTH_DATE}, {DEATH_DATE})
             VALUES (?1, ?2, '', '')"
        ),
        params![stage_name, stage_name],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_group(conn: &Connection, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        &format!("INSERT INTO {GROUPS} ({NAME}, {START_DATE}, {END_DATE}) VALUES (?1, ?2, ?2)"),
        params![name, UNKNOWN],
    )?;
    Ok(conn.last_insert_rowid())
}
