//! Application configuration read from environment variables.
//!
//! A `.env` file in the working directory is loaded first, so local
//! development does not need the variables exported in the shell.

use std::path::PathBuf;

use rusqlite::Connection;

use crate::Error;

/// The secret used when `SECRET_KEY` is not set. Only suitable for development.
const DEFAULT_SECRET_KEY: &str = "devkey";
/// The database used when `DATABASE_URL` is not set.
const DEFAULT_DATABASE_URL: &str = "sqlite://app.db";

/// Where the application database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A SQLite database file.
    File(PathBuf),
    /// A SQLite database that only lives for as long as the process.
    InMemory,
}

impl DatabaseLocation {
    /// Open a connection to the database.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the database file cannot be opened or created.
    pub fn open(&self) -> Result<Connection, Error> {
        let connection = match self {
            DatabaseLocation::File(path) => Connection::open(path)?,
            DatabaseLocation::InMemory => Connection::open_in_memory()?,
        };

        Ok(connection)
    }
}

/// The settings needed to start the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The secret used to derive the key for encrypting cookies.
    pub secret_key: String,
    /// The normalized database URL, as given in `DATABASE_URL`.
    pub database_url: String,
    /// Where the database lives, parsed from `database_url`.
    pub database: DatabaseLocation,
    /// Whether to run with verbose logging and live reload.
    pub debug: bool,
}

impl Config {
    /// Read the config from the process environment, loading `.env` first if it exists.
    ///
    /// # Errors
    /// Returns an [Error::UnsupportedDatabase] if `DATABASE_URL` is not a SQLite URL.
    pub fn from_env() -> Result<Self, Error> {
        // Logging is not set up yet, so a missing .env file is not reported.
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config using `lookup` to get the value of each variable.
    ///
    /// # Errors
    /// Returns an [Error::UnsupportedDatabase] if `DATABASE_URL` is not a SQLite URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let secret_key = lookup("SECRET_KEY")
            .filter(|secret| !secret.is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_owned());

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| normalize_database_url(&url))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());
        let database = parse_database_url(&database_url)?;

        let debug = lookup("APP_ENV").is_some_and(|env| env == "development")
            || lookup("DEBUG").is_some_and(|flag| is_truthy(&flag));

        Ok(Self {
            secret_key,
            database_url,
            database,
            debug,
        })
    }

    /// Whether `SECRET_KEY` was missing and the insecure development key is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Replace the legacy `postgres://` scheme with `postgresql://`.
///
/// Other URLs are returned unchanged.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_owned(),
    }
}

/// Parse a normalized database URL.
///
/// Accepts `sqlite:///relative.db`, `sqlite:////absolute.db`, `sqlite://file.db`,
/// `sqlite::memory:` and bare file paths.
fn parse_database_url(url: &str) -> Result<DatabaseLocation, Error> {
    let path = match url.strip_prefix("sqlite:") {
        Some(rest) => match rest.strip_prefix("//") {
            Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
            None => rest,
        },
        None if url.contains("://") => return Err(Error::UnsupportedDatabase(url.to_owned())),
        None => url,
    };

    match path {
        "" | ":memory:" => Ok(DatabaseLocation::InMemory),
        path => Ok(DatabaseLocation::File(PathBuf::from(path))),
    }
}

fn is_truthy(flag: &str) -> bool {
    matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
