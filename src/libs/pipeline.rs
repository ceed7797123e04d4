//! Catalog -> structs -> artifacts.
//!
//! Tables are handled strictly one after another in catalog order. A
//! failure while reading or assembling one table is recorded and the table
//! is dropped; only failing to list tables aborts the run.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::libs::assembler::{self, StructDef};
use crate::libs::catalog::Catalog;
use crate::libs::config::GeneratorConfig;
use crate::libs::emitter::{Artifact, Emitter, Mode};
use crate::libs::error::CatalogError;
use crate::libs::schema::TableDescriptor;

/// A table that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFailure {
    pub table: String,
    pub reason: String,
}

/// Tables read from the catalog, in catalog order.
#[derive(Debug, Default)]
pub struct Collected {
    pub tables: Vec<TableDescriptor>,
    pub failures: Vec<TableFailure>,
    /// Tables with no readable columns.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Partial,
}

/// Result of one generation run.
#[derive(Debug, Default)]
pub struct Generation {
    pub structs: Vec<StructDef>,
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<TableFailure>,
    pub skipped: Vec<String>,
}

impl Generation {
    pub fn status(&self) -> RunStatus {
        if self.failures.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::Partial
        }
    }
}

/// Reads every wanted table's columns.
///
/// Errors only when the table list itself cannot be read.
pub async fn collect(
    catalog: &dyn Catalog,
    config: &GeneratorConfig,
) -> Result<Collected, CatalogError> {
    let names = catalog.list_tables(&config.schema).await?;
    info!(schema = %config.schema, count = names.len(), "listed tables");
    for (index, name) in names.iter().enumerate() {
        info!(index = index + 1, table = %name, "found table");
    }

    let mut collected = Collected::default();
    for name in names {
        if !config.wants_table(&name) {
            debug!(table = %name, "filtered out");
            continue;
        }

        match catalog.list_columns(&config.schema, &name).await {
            Ok(columns) if columns.is_empty() => {
                warn!(table = %name, "no columns, skipped");
                collected.skipped.push(name);
            }
            Ok(columns) => {
                debug!(table = %name, columns = columns.len(), "read columns");
                collected.tables.push(TableDescriptor::new(name, columns));
            }
            Err(err) => {
                warn!(table = %name, error = %err, "failed to read columns");
                collected.failures.push(TableFailure {
                    table: name,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(collected)
}

/// Assembles and renders already-read tables. Never touches the catalog,
/// so `Mode::Both` costs a single catalog pass.
pub fn generate(tables: &[TableDescriptor], mode: Mode, emitter: &Emitter) -> Generation {
    let mut generation = Generation::default();

    for table in tables {
        if table.is_empty() {
            generation.skipped.push(table.name.clone());
            continue;
        }
        match assembler::assemble(table) {
            Ok(def) => generation.structs.push(def),
            Err(err) => {
                warn!(table = %table.name, error = %err, "failed to assemble");
                generation.failures.push(TableFailure {
                    table: table.name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    generation.artifacts = emitter.render(mode, &generation.structs);
    info!(
        structs = generation.structs.len(),
        artifacts = generation.artifacts.len(),
        %mode,
        "rendered"
    );
    generation
}

/// Full run: one catalog pass, then assembly and rendering.
pub async fn run(catalog: &dyn Catalog, config: &GeneratorConfig) -> Result<Generation, CatalogError> {
    let collected = collect(catalog, config).await?;
    if collected.tables.is_empty() && collected.failures.is_empty() {
        warn!(schema = %config.schema, "no tables found");
    }

    let emitter = Emitter::new(config.language.renderer(), config.package.clone());
    let mut generation = generate(&collected.tables, config.mode, &emitter);

    let mut failures = collected.failures;
    failures.append(&mut generation.failures);
    generation.failures = failures;

    let mut skipped = collected.skipped;
    skipped.append(&mut generation.skipped);
    generation.skipped = skipped;

    Ok(generation)
}
