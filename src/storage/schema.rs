use rusqlite::Connection;

pub mod tables {
    pub const TYPES: &str = "types";
    pub const PERFORMERS: &str = "performers";
    pub const PERSONS: &str = "persons";
    pub const GROUPS: &str = "groups";
    pub const IN_GROUP: &str = "in_group";
    pub const ALBUMS: &str = "albums";
    pub const ROLAS: &str = "rolas";

    pub const ALL_TABLES: &[&str] = &[TYPES, PERFORMERS, PERSONS, GROUPS, IN_GROUP, ALBUMS, ROLAS];
}

pub mod columns {
    pub const ID_TYPE: &str = "id_type";
    pub const ID_PERFORMER: &str = "id_performer";
    pub const ID_PERSON: &str = "id_person";
    pub const ID_GROUP: &str = "id_group";
    pub const ID_ALBUM: &str = "id_album";
    pub const ID_ROLA: &str = "id_rola";
    pub const NAME: &str = "name";
    pub const STAGE_NAME: &str = "stage_name";
    pub const REAL_NAME: &str = "real_name";
    pub const BIRTH_DATE: &str = "birth_date";
    pub const DEATH_DATE: &str = "death_date";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const PATH: &str = "path";
    pub const TITLE: &str = "title";
    pub const TRACK: &str = "track";
    pub const YEAR: &str = "year";
    pub const GENRE: &str = "genre";
}

/// Id of the seeded "Unknown" row of `types`
pub const UNKNOWN_PERFORMER_TYPE: i64 = 2;

// bundled sqlite enforces foreign keys by default; they stay declared but switched off
// because append mode writes placeholder references before the rows they point to exist
const SCHEMA: &str = r#"
PRAGMA foreign_keys = OFF;

CREATE TABLE IF NOT EXISTS types (
    id_type INTEGER PRIMARY KEY,
    description TEXT
);

INSERT OR IGNORE INTO types (id_type, description) VALUES
    (0, 'Person'),
    (1, 'Group'),
    (2, 'Unknown');

CREATE TABLE IF NOT EXISTS performers (
    id_performer INTEGER PRIMARY KEY,
    id_type INTEGER,
    name TEXT,
    FOREIGN KEY (id_type) REFERENCES types(id_type)
);

CREATE TABLE IF NOT EXISTS persons (
    id_person INTEGER PRIMARY KEY,
    stage_name TEXT,
    real_name TEXT,
    birth_date TEXT,
    death_date TEXT
);

CREATE TABLE IF NOT EXISTS groups (
    id_group INTEGER PRIMARY KEY,
    name TEXT,
    start_date TEXT,
    end_date TEXT
);

CREATE TABLE IF NOT EXISTS in_group (
    id_person INTEGER,
    id_group INTEGER,
    PRIMARY KEY (id_person, id_group),
    FOREIGN KEY (id_person) REFERENCES persons(id_person),
    FOREIGN KEY (id_group) REFERENCES groups(id_group)
);

CREATE TABLE IF NOT EXISTS albums (
    id_album INTEGER PRIMARY KEY,
    path TEXT,
    name TEXT,
    year INTEGER
);

CREATE TABLE IF NOT EXISTS rolas (
    id_rola INTEGER PRIMARY KEY,
    id_performer INTEGER,
    id_album INTEGER,
    path TEXT,
    title TEXT,
    track INTEGER,
    year INTEGER,
    genre TEXT,
    FOREIGN KEY (id_performer) REFERENCES performers(id_performer),
    FOREIGN KEY (id_album) REFERENCES albums(id_album)
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
