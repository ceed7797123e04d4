use std::collections::BTreeSet;
use std::fmt::Write;

use crate::libs::assembler::{FieldDef, StructDef};
use crate::libs::renderer::Renderer;
use crate::libs::types::{ScalarType, TypeDescriptor};

/// Emits gofmt-aligned Go structs with `db` and `json` tags.
pub struct GoRenderer;

impl GoRenderer {
    fn scalar_name(scalar: &ScalarType) -> String {
        let name = match scalar {
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 | ScalarType::Decimal | ScalarType::Money => "float64",
            ScalarType::Bool => "bool",
            ScalarType::Text
            | ScalarType::Uuid
            | ScalarType::Interval
            | ScalarType::Inet
            | ScalarType::MacAddr => "string",
            ScalarType::Date
            | ScalarType::Time
            | ScalarType::TimeTz
            | ScalarType::Timestamp
            | ScalarType::TimestampTz => "time.Time",
            ScalarType::Bytes => "[]byte",
            ScalarType::Json => "json.RawMessage",
            ScalarType::Raw(_) => "interface{}",
            ScalarType::List(element) => return format!("[]{}", Self::scalar_name(element)),
        };
        name.to_string()
    }

    /// Slices, raw JSON and interfaces already have a nil value.
    fn is_nilable(scalar: &ScalarType) -> bool {
        matches!(
            scalar,
            ScalarType::Bytes | ScalarType::Json | ScalarType::Raw(_) | ScalarType::List(_)
        )
    }

    fn scalar_imports(scalar: &ScalarType) -> Vec<&'static str> {
        match scalar {
            ScalarType::List(element) => Self::scalar_imports(element),
            ScalarType::Json => vec!["encoding/json"],
            s if s.is_timestamp() => vec!["time"],
            _ => Vec::new(),
        }
    }

    fn tag(field: &FieldDef) -> String {
        let column = &field.tag.column;
        let mut db = column.clone();
        if field.tag.primary_key {
            db.push_str(",pk");
        }
        if field.tag.nullable {
            db.push_str(",nullable");
        }
        let json = if field.tag.nullable {
            format!("{column},omitempty")
        } else {
            column.clone()
        };
        format!("`db:\"{db}\" json:\"{json}\"`")
    }
}

impl Renderer for GoRenderer {
    fn extension(&self) -> &'static str {
        "go"
    }

    fn type_name(&self, ty: &TypeDescriptor) -> String {
        let base = Self::scalar_name(&ty.scalar);
        if ty.nullable && !Self::is_nilable(&ty.scalar) {
            format!("*{base}")
        } else {
            base
        }
    }

    fn type_imports(&self, ty: &TypeDescriptor) -> Vec<&'static str> {
        Self::scalar_imports(&ty.scalar)
    }

    fn header(&self, package: &str, imports: &BTreeSet<&'static str>) -> String {
        let mut out = String::from("// Code generated by schema2struct. DO NOT EDIT.\n\n");
        let _ = writeln!(out, "package {package}");
        if !imports.is_empty() {
            out.push_str("\nimport (\n");
            for import in imports {
                let _ = writeln!(out, "\t\"{import}\"");
            }
            out.push_str(")\n");
        }
        out
    }

    fn render_struct(&self, def: &StructDef) -> String {
        let rows: Vec<(&str, String, String)> = def
            .fields
            .iter()
            .map(|f| (f.ident.as_str(), self.type_name(&f.ty), Self::tag(f)))
            .collect();
        let name_width = rows.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
        let type_width = rows.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(out, "// {} maps table \"{}\".", def.ident, def.table);
        let _ = writeln!(out, "type {} struct {{", def.ident);
        for (name, ty, tag) in &rows {
            let _ = writeln!(out, "\t{name:<name_width$} {ty:<type_width$} {tag}");
        }
        out.push_str("}\n");
        out
    }
}
