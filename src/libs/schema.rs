// schema.rs
use serde::{Deserialize, Serialize};

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Raw `data_type`, e.g. `integer`, `character varying`, `ARRAY`.
    pub sql_type: String,
    /// `udt_name`, used to resolve array element types (`_int4`).
    pub udt_name: Option<String>,
    /// Declared numeric precision, in bits for integer types.
    pub precision: Option<i32>,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            udt_name: None,
            precision: None,
            is_nullable: false,
            is_primary_key: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_udt(mut self, udt_name: impl Into<String>) -> Self {
        self.udt_name = Some(udt_name.into());
        self
    }

    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }
}

/// A base table and its columns in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
