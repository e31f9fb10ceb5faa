//! Database schema and migrations.
//!
//! Migrations run in order on open; `schema_version` records the applied ones.
//! Timestamps are UTC text (`YYYY-MM-DD HH:MM:SS`) written by the application.

/// SQLite migrations.
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: users, posts, comments, files
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,                 -- Argon2 PHC string
    email       TEXT NOT NULL UNIQUE,
    role        TEXT NOT NULL DEFAULT 'user',  -- 'user' or 'admin'
    created_at  TEXT NOT NULL
);

CREATE TABLE posts (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    INTEGER NOT NULL REFERENCES users(id),
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    secret      INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_posts_created_at ON posts(created_at);
CREATE INDEX idx_posts_owner_id ON posts(owner_id);

CREATE TABLE comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    owner_id    INTEGER NOT NULL REFERENCES users(id),
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_comments_post_id ON comments(post_id);
CREATE INDEX idx_comments_owner_id ON comments(owner_id);

CREATE TABLE files (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id       INTEGER REFERENCES posts(id) ON DELETE CASCADE,  -- NULL for unattached uploads
    uploader_id   INTEGER NOT NULL REFERENCES users(id),
    original_name TEXT NOT NULL,
    stored_name   TEXT NOT NULL UNIQUE,        -- UUID.ext
    path          TEXT NOT NULL,               -- relative to the storage root
    content_type  TEXT NOT NULL,
    size          INTEGER NOT NULL,
    uploaded_at   TEXT NOT NULL
);

CREATE INDEX idx_files_post_id ON files(post_id);
"#,
    // v2: refresh tokens
    r#"
CREATE TABLE refresh_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    revoked_at  TEXT
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
"#,
];

/// PostgreSQL migrations.
#[cfg(feature = "postgres")]
pub const MIGRATIONS: &[&str] = &[
    // v1: users, posts, comments, files
    r#"
CREATE TABLE users (
    id          BIGSERIAL PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,
    email       TEXT NOT NULL UNIQUE,
    role        TEXT NOT NULL DEFAULT 'user',
    created_at  TEXT NOT NULL
);

CREATE TABLE posts (
    id          BIGSERIAL PRIMARY KEY,
    owner_id    BIGINT NOT NULL REFERENCES users(id),
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    secret      BOOLEAN NOT NULL DEFAULT FALSE,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_posts_created_at ON posts(created_at);
CREATE INDEX idx_posts_owner_id ON posts(owner_id);

CREATE TABLE comments (
    id          BIGSERIAL PRIMARY KEY,
    post_id     BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    owner_id    BIGINT NOT NULL REFERENCES users(id),
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX idx_comments_post_id ON comments(post_id);
CREATE INDEX idx_comments_owner_id ON comments(owner_id);

CREATE TABLE files (
    id            BIGSERIAL PRIMARY KEY,
    post_id       BIGINT REFERENCES posts(id) ON DELETE CASCADE,
    uploader_id   BIGINT NOT NULL REFERENCES users(id),
    original_name TEXT NOT NULL,
    stored_name   TEXT NOT NULL UNIQUE,
    path          TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    size          BIGINT NOT NULL,
    uploaded_at   TEXT NOT NULL
);

CREATE INDEX idx_files_post_id ON files(post_id);
"#,
    // v2: refresh tokens
    r#"
CREATE TABLE refresh_tokens (
    id          BIGSERIAL PRIMARY KEY,
    user_id     BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token       TEXT NOT NULL UNIQUE,
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    revoked_at  TEXT
);

CREATE INDEX idx_refresh_tokens_user_id ON refresh_tokens(user_id);
"#,
];
