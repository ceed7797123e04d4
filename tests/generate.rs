use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schema2struct::{
    Catalog, CatalogError, ColumnInfo, Emitter, GeneratorConfig, Language, Mode, RunStatus,
    TableDescriptor, generate, run,
};

/// In-memory catalog that counts its queries.
#[derive(Default)]
struct FakeCatalog {
    tables: Vec<(String, Vec<ColumnInfo>)>,
    broken: Vec<String>,
    fail_listing: bool,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeCatalog {
    fn table(mut self, name: &str, columns: Vec<ColumnInfo>) -> Self {
        self.tables.push((name.to_string(), columns));
        self
    }

    fn broken(mut self, name: &str) -> Self {
        self.tables.push((name.to_string(), Vec::new()));
        self.broken.push(name.to_string());
        self
    }

    fn calls(&self, key: &str) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn record(&self, key: &str) {
        *self.calls.lock().unwrap().entry(key.to_string()).or_default() += 1;
    }
}

fn query_error() -> sqlx::Error {
    sqlx::Error::Protocol("relation vanished".into())
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        self.record("tables");
        if self.fail_listing {
            return Err(CatalogError::ListTables {
                schema: schema.to_string(),
                source: query_error(),
            });
        }
        let mut names: Vec<String> = self.tables.iter().map(|(n, _)| n.clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, CatalogError> {
        self.record(table);
        if self.broken.iter().any(|t| t == table) {
            return Err(CatalogError::ListColumns {
                schema: schema.to_string(),
                table: table.to_string(),
                source: query_error(),
            });
        }
        Ok(self
            .tables
            .iter()
            .find(|(n, _)| n == table)
            .map(|(_, c)| c.clone())
            .unwrap_or_default())
    }
}

fn users_columns() -> Vec<ColumnInfo> {
    vec![
        ColumnInfo::new("id", "integer").primary_key(),
        ColumnInfo::new("email", "text").nullable(),
        ColumnInfo::new("created_at", "timestamp without time zone"),
    ]
}

fn posts_columns() -> Vec<ColumnInfo> {
    vec![
        ColumnInfo::new("id", "bigint").primary_key(),
        ColumnInfo::new("user_id", "integer"),
        ColumnInfo::new("body", "text"),
    ]
}

fn config(mode: Mode, language: Language) -> GeneratorConfig {
    GeneratorConfig {
        mode,
        language,
        ..Default::default()
    }
}

#[tokio::test]
async fn combined_mode_keeps_field_order_and_types() {
    let catalog = FakeCatalog::default().table("users", users_columns());
    let generation = run(&catalog, &config(Mode::Combined, Language::Rust)).await.unwrap();

    assert_eq!(generation.artifacts.len(), 1);
    let artifact = &generation.artifacts[0];
    assert_eq!(artifact.name, "models.rs");
    assert_eq!(artifact.body.matches("pub struct ").count(), 1);

    let id = artifact.body.find("pub id: i32,").unwrap();
    let email = artifact.body.find("pub email: Option<String>,").unwrap();
    let created = artifact.body.find("pub created_at: NaiveDateTime,").unwrap();
    assert!(id < email && email < created);
    assert!(artifact.body.contains("use chrono::NaiveDateTime;"));
}

#[tokio::test]
async fn combined_mode_in_go() {
    let catalog = FakeCatalog::default().table("users", users_columns());
    let generation = run(&catalog, &config(Mode::Combined, Language::Go)).await.unwrap();

    let body = &generation.artifacts[0].body;
    assert_eq!(generation.artifacts[0].name, "models.go");
    assert!(body.contains("package models\n"));
    assert!(body.contains("\t\"time\"\n"));
    assert!(body.contains("type Users struct {"));
    assert!(body.contains("\tId        int32"));
    assert!(body.contains("\tEmail     *string"));
    assert!(body.contains("\tCreatedAt time.Time"));
}

#[tokio::test]
async fn separate_mode_writes_one_artifact_per_table() {
    let catalog = FakeCatalog::default()
        .table("users", users_columns())
        .table("posts", posts_columns());
    let generation = run(&catalog, &config(Mode::Separate, Language::Go)).await.unwrap();

    let names: Vec<_> = generation.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["posts.go", "users.go"]);
    for artifact in &generation.artifacts {
        assert_eq!(artifact.body.matches("type ").count(), 1);
    }
    // posts has no time column, so no time import
    assert!(!generation.artifacts[0].body.contains("\"time\""));
    assert!(generation.artifacts[1].body.contains("\"time\""));
}

#[tokio::test]
async fn both_mode_reads_the_catalog_once() {
    let catalog = FakeCatalog::default()
        .table("users", users_columns())
        .table("posts", posts_columns());
    let generation = run(&catalog, &config(Mode::Both, Language::Rust)).await.unwrap();

    let names: Vec<_> = generation.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["posts.rs", "users.rs", "models.rs"]);
    assert_eq!(catalog.calls("tables"), 1);
    assert_eq!(catalog.calls("users"), 1);
    assert_eq!(catalog.calls("posts"), 1);
}

#[tokio::test]
async fn failing_table_is_dropped_and_run_is_partial() {
    let catalog = FakeCatalog::default()
        .table("users", users_columns())
        .broken("audit_log")
        .table("posts", posts_columns());
    let generation = run(&catalog, &config(Mode::Separate, Language::Rust)).await.unwrap();

    let names: Vec<_> = generation.artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["posts.rs", "users.rs"]);
    assert_eq!(generation.structs.len(), 2);
    assert_eq!(generation.failures.len(), 1);
    assert_eq!(generation.failures[0].table, "audit_log");
    assert!(generation.failures[0].reason.contains("audit_log"));
    assert_eq!(generation.status(), RunStatus::Partial);
}

#[tokio::test]
async fn listing_failure_aborts() {
    let catalog = FakeCatalog {
        fail_listing: true,
        ..Default::default()
    };
    let err = run(&catalog, &GeneratorConfig::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::ListTables { .. }));
}

#[tokio::test]
async fn empty_tables_are_skipped_not_failed() {
    let catalog = FakeCatalog::default()
        .table("ghost", Vec::new())
        .table("users", users_columns());
    let generation = run(&catalog, &config(Mode::Combined, Language::Rust)).await.unwrap();

    assert_eq!(generation.skipped, ["ghost"]);
    assert_eq!(generation.structs.len(), 1);
    assert_eq!(generation.status(), RunStatus::Success);
}

#[tokio::test]
async fn filters_apply_before_columns_are_read() {
    let catalog = FakeCatalog::default()
        .table("users", users_columns())
        .table("schema_migrations", vec![ColumnInfo::new("version", "bigint")]);
    let config = GeneratorConfig {
        exclude: vec!["schema_migrations".into()],
        ..Default::default()
    };
    let generation = run(&catalog, &config).await.unwrap();

    assert_eq!(generation.structs.len(), 1);
    assert_eq!(catalog.calls("schema_migrations"), 0);
}

#[test]
fn generate_reports_identifier_failures_per_table() {
    let tables = vec![
        TableDescriptor::new("___", vec![ColumnInfo::new("id", "integer")]),
        TableDescriptor::new("users", users_columns()),
    ];
    let emitter = Emitter::new(Language::Rust.renderer(), "models");
    let generation = generate(&tables, Mode::Separate, &emitter);

    assert_eq!(generation.artifacts.len(), 1);
    assert_eq!(generation.failures[0].table, "___");
}

#[test]
fn timestamp_import_only_when_used() {
    let emitter = Emitter::new(Language::Rust.renderer(), "models");
    let without = generate(
        &[TableDescriptor::new("posts", posts_columns())],
        Mode::Combined,
        &emitter,
    );
    let with = generate(
        &[TableDescriptor::new("users", users_columns())],
        Mode::Combined,
        &emitter,
    );

    assert!(!without.artifacts[0].body.contains("chrono"));
    assert!(with.artifacts[0].body.contains("use chrono::NaiveDateTime;"));
    assert!(!with.artifacts[0].body.contains("uuid"));
}

#[test]
fn struct_named_after_an_import_is_suffixed() {
    let emitter = Emitter::new(Language::Rust.renderer(), "models");
    let generation = generate(
        &[TableDescriptor::new(
            "value",
            vec![
                ColumnInfo::new("id", "integer").primary_key(),
                ColumnInfo::new("doc", "jsonb"),
            ],
        )],
        Mode::Combined,
        &emitter,
    );

    let body = &generation.artifacts[0].body;
    assert!(body.contains("use serde_json::Value;"));
    assert!(body.contains("pub struct ValueRow {"));
    assert!(!body.contains("pub struct Value {"));
    assert!(body.contains("    pub doc: Value,"));
}

#[test]
fn rust_field_names_stay_unique_after_snake_casing() {
    let emitter = Emitter::new(Language::Rust.renderer(), "models");
    let generation = generate(
        &[TableDescriptor::new(
            "sessions",
            vec![
                ColumnInfo::new("userID", "integer"),
                ColumnInfo::new("user_id", "bigint"),
            ],
        )],
        Mode::Separate,
        &emitter,
    );

    let body = &generation.artifacts[0].body;
    assert!(body.contains("    pub user_id: i32,"));
    assert!(body.contains("    pub user_id2: i64,"));
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn each_found_table_is_logged_with_its_index() {
    let logs = LogBuffer::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .without_time()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let catalog = FakeCatalog::default()
        .table("users", users_columns())
        .table("posts", posts_columns());
    run(&catalog, &GeneratorConfig::default()).await.unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let posts = output.find("found table index=1 table=posts").unwrap();
    let users = output.find("found table index=2 table=users").unwrap();
    assert!(posts < users);
}
