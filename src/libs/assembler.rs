//! Table -> struct definition assembly.
//!
//! The output is a structured intermediate; turning it into source text is
//! the renderers' job.

use std::collections::HashSet;

use crate::libs::error::InvalidIdentifierError;
use crate::libs::ident;
use crate::libs::schema::{ColumnInfo, TableDescriptor};
use crate::libs::types::{self, TypeDescriptor};

/// Column metadata carried onto the generated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTag {
    pub column: String,
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Exported PascalCase identifier, unique within the struct.
    pub ident: String,
    pub ty: TypeDescriptor,
    pub tag: ColumnTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub table: String,
    pub ident: String,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.fields.iter().map(|f| &f.ty)
    }
}

/// Builds one struct definition from a table, keeping column order.
///
/// The table name is only re-cased, never singularized. When two columns
/// derive the same identifier the later one gets a numeric suffix
/// (`UserId`, `UserId2`).
pub fn assemble(table: &TableDescriptor) -> Result<StructDef, InvalidIdentifierError> {
    let ident = ident::derive(&table.name)?;

    let mut seen = HashSet::with_capacity(table.columns.len());
    let mut fields = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        let base = ident::derive(&column.name)?;
        let field_ident = ident::unique(&base, &mut seen);
        if field_ident != base {
            tracing::warn!(
                table = %table.name,
                column = %column.name,
                field = %field_ident,
                "field identifier collision, suffix appended"
            );
        }
        fields.push(field(field_ident, column));
    }

    Ok(StructDef {
        table: table.name.clone(),
        ident,
        fields,
    })
}

fn field(ident: String, column: &ColumnInfo) -> FieldDef {
    FieldDef {
        ident,
        ty: types::map_column(column),
        tag: ColumnTag {
            column: column.name.clone(),
            sql_type: column.sql_type.clone(),
            nullable: column.is_nullable,
            primary_key: column.is_primary_key,
        },
    }
}
