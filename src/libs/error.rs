//! Error types for catalog reads, code generation and artifact writes.

use std::path::PathBuf;

use thiserror::Error;

/// Connectivity or query failure against the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to list tables in schema '{schema}': {source}")]
    ListTables {
        schema: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to list columns of '{schema}.{table}': {source}")]
    ListColumns {
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

/// An SQL name that cannot become an exported identifier.
///
/// Catalog names are never empty, so this signals a broken invariant
/// rather than bad user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot derive an identifier from '{input}'")]
pub struct InvalidIdentifierError {
    pub input: String,
}

/// Failure persisting one artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure loading or validating the generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no database URL given (use --db or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("invalid package name '{0}'")]
    InvalidPackage(String),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
