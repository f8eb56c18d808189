//! Table definitions.

use rusqlite::Connection;

use shoebox_core::FileCategory;

use crate::error::CatalogError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS file_groups (
    id          INTEGER PRIMARY KEY,
    path        TEXT NOT NULL,
    name        TEXT NOT NULL,
    created     TEXT NOT NULL,
    UNIQUE (path, name)
);

CREATE TABLE IF NOT EXISTS gps_coordinates (
    id            INTEGER PRIMARY KEY,
    latitude      TEXT NOT NULL,
    latitude_ref  TEXT NOT NULL,
    longitude     TEXT NOT NULL,
    longitude_ref TEXT NOT NULL,
    altitude      REAL,
    direction     REAL,
    satellites    INTEGER,
    country       TEXT,
    state         TEXT,
    city          TEXT,
    street        TEXT,
    sub_location  TEXT,
    UNIQUE (latitude, latitude_ref, longitude, longitude_ref)
);

CREATE TABLE IF NOT EXISTS entries (
    id                       INTEGER PRIMARY KEY,
    group_id                 INTEGER NOT NULL REFERENCES file_groups(id),
    category                 TEXT NOT NULL,
    filename                 TEXT NOT NULL,
    file_path                TEXT NOT NULL,
    mime_type                TEXT NOT NULL,
    file_size                INTEGER NOT NULL,
    digest                   TEXT NOT NULL,
    created                  TEXT NOT NULL,
    creator_user             INTEGER NOT NULL,
    acl_id                   INTEGER NOT NULL,
    external_file_id         TEXT NOT NULL,
    original_datetime        TEXT,
    original_second_fraction INTEGER NOT NULL DEFAULT 0,
    original_document_id     TEXT UNIQUE,
    description              TEXT,
    label                    TEXT,
    rights_holder            TEXT,
    rights_terms             TEXT,
    rights_url               TEXT,
    creator_name             TEXT,
    creator_email            TEXT,
    creator_country          TEXT,
    creator_url              TEXT,
    gps_id                   INTEGER REFERENCES gps_coordinates(id),
    gps_timestamp            TEXT,
    metadata_raw             TEXT,
    UNIQUE (file_path, filename)
);

CREATE INDEX IF NOT EXISTS idx_entries_group ON entries(group_id);
CREATE INDEX IF NOT EXISTS idx_entries_digest ON entries(digest);

CREATE TABLE IF NOT EXISTS archive_entries (
    entry_id          INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    compression       TEXT,
    uncompressed_size INTEGER,
    content_count     INTEGER,
    encrypted         INTEGER
);

CREATE TABLE IF NOT EXISTS audio_entries (
    entry_id    INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    duration    REAL,
    bit_rate    TEXT,
    sample_rate INTEGER,
    codec       TEXT,
    channels    INTEGER
);

CREATE TABLE IF NOT EXISTS binary_entries (
    entry_id               INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    software_name          TEXT,
    software_major_version TEXT
);

CREATE TABLE IF NOT EXISTS data_entries (
    entry_id       INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    data_structure TEXT
);

CREATE TABLE IF NOT EXISTS document_entries (
    entry_id   INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    page_count INTEGER,
    format     TEXT
);

CREATE TABLE IF NOT EXISTS executable_entries (
    entry_id          INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    operating_systems TEXT NOT NULL,
    script            INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS font_entries (
    entry_id INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    family   TEXT,
    weight   TEXT,
    style    TEXT
);

CREATE TABLE IF NOT EXISTS icon_entries (
    entry_id INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    width    INTEGER,
    height   INTEGER,
    scalable INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS image_entries (
    entry_id    INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    width       INTEGER,
    height      INTEGER,
    color_depth INTEGER NOT NULL,
    dpi         INTEGER NOT NULL,
    group_label TEXT
);

CREATE TABLE IF NOT EXISTS interactive_entries (
    entry_id   INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    technology TEXT
);

CREATE TABLE IF NOT EXISTS thumb_entries (
    entry_id      INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    target_entry  INTEGER REFERENCES entries(id) ON DELETE SET NULL,
    relation_type TEXT
);

CREATE TABLE IF NOT EXISTS vector_entries (
    entry_id INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    width    INTEGER,
    height   INTEGER,
    layers   INTEGER
);

CREATE TABLE IF NOT EXISTS video_entries (
    entry_id   INTEGER PRIMARY KEY REFERENCES entries(id) ON DELETE CASCADE,
    width      INTEGER,
    height     INTEGER,
    frame_rate REAL,
    duration   REAL,
    codec      TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS entry_tags (
    entry_id INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    tag_id   INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (entry_id, tag_id)
);

CREATE TABLE IF NOT EXISTS metadata_facts (
    id         INTEGER PRIMARY KEY,
    entry_id   INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    group_name TEXT NOT NULL,
    tag_key    TEXT NOT NULL,
    tag_value  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_facts_entry ON metadata_facts(entry_id);

CREATE TABLE IF NOT EXISTS exports (
    id          INTEGER PRIMARY KEY,
    entry_id    INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE,
    filename    TEXT NOT NULL,
    file_path   TEXT NOT NULL,
    mime_type   TEXT,
    file_size   INTEGER NOT NULL,
    digest      TEXT NOT NULL,
    document_id TEXT UNIQUE,
    created     TEXT NOT NULL,
    UNIQUE (file_path, filename)
);
"#;

/// Create any missing tables.
pub fn initialize(conn: &Connection) -> Result<(), CatalogError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Table holding the details of `category`, `None` for `Unknown`.
pub fn details_table(category: FileCategory) -> Option<&'static str> {
    let table = match category {
        FileCategory::Archive => "archive_entries",
        FileCategory::Audio => "audio_entries",
        FileCategory::Binary => "binary_entries",
        FileCategory::Data => "data_entries",
        FileCategory::Document => "document_entries",
        FileCategory::Executable => "executable_entries",
        FileCategory::Font => "font_entries",
        FileCategory::Icon => "icon_entries",
        FileCategory::Image => "image_entries",
        FileCategory::Interactive => "interactive_entries",
        FileCategory::Thumb => "thumb_entries",
        FileCategory::Vector => "vector_entries",
        FileCategory::Video => "video_entries",
        FileCategory::Unknown => return None,
    };
    Some(table)
}
