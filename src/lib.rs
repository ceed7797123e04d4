//! Generates model structs from a live PostgreSQL schema.
//!
//! ```no_run
//! use schema2struct::{GeneratorConfig, Language, Mode, PgCatalog, run};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = PgCatalog::connect("postgres://localhost/app").await?;
//! let config = GeneratorConfig {
//!     mode: Mode::Both,
//!     language: Language::Go,
//!     ..Default::default()
//! };
//! let generation = run(&catalog, &config).await?;
//! for artifact in &generation.artifacts {
//!     println!("{}", artifact.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod libs;

pub use libs::*;
