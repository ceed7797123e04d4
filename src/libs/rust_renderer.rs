use std::collections::{BTreeSet, HashSet};
use std::fmt::Write;

use crate::libs::assembler::{FieldDef, StructDef};
use crate::libs::ident;
use crate::libs::renderer::Renderer;
use crate::libs::types::{ScalarType, TypeDescriptor};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const NON_RAW: &[&str] = &["crate", "self", "super", "Self"];

/// Type names a generated file imports or takes from the prelude. A struct
/// with one of these names would shadow the type its own fields refer to.
const RESERVED_TYPES: &[&str] = &[
    "Option", "String", "Vec", "Serialize", "Deserialize", "FromRow", "Decimal", "DateTime",
    "Utc", "NaiveDate", "NaiveTime", "NaiveDateTime", "Uuid", "Value", "PgInterval", "PgMoney",
    "PgTimeTz", "IpNetwork", "MacAddress",
];

/// Appended to struct names that are reserved.
const TYPE_SUFFIX: &str = "Row";

/// Emits `serde` + `sqlx::FromRow` structs.
///
/// A struct only derives `FromRow` when sqlx can decode every column, and
/// only derives the serde traits when every field type implements them.
pub struct RustRenderer;

/// Which optional derives a struct gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Derives {
    serde: bool,
    from_row: bool,
}

impl Derives {
    fn of(def: &StructDef) -> Self {
        Self {
            serde: def.types().all(|ty| RustRenderer::has_serde(&ty.scalar)),
            from_row: !def.types().any(TypeDescriptor::is_raw),
        }
    }

    fn attribute(self) -> String {
        let mut derives = vec!["Debug", "Clone", "PartialEq"];
        if self.serde {
            derives.extend(["Serialize", "Deserialize"]);
        }
        if self.from_row {
            derives.push("FromRow");
        }
        format!("#[derive({})]", derives.join(", "))
    }
}

impl RustRenderer {
    fn scalar_name(scalar: &ScalarType) -> String {
        let name = match scalar {
            ScalarType::Int16 => "i16",
            ScalarType::Int32 => "i32",
            ScalarType::Int64 => "i64",
            ScalarType::Float32 => "f32",
            ScalarType::Float64 => "f64",
            ScalarType::Decimal => "Decimal",
            ScalarType::Money => "PgMoney",
            ScalarType::Bool => "bool",
            ScalarType::Text | ScalarType::Raw(_) => "String",
            ScalarType::Date => "NaiveDate",
            ScalarType::Time => "NaiveTime",
            ScalarType::TimeTz => "PgTimeTz",
            ScalarType::Interval => "PgInterval",
            ScalarType::Timestamp => "NaiveDateTime",
            ScalarType::TimestampTz => "DateTime<Utc>",
            ScalarType::Bytes => "Vec<u8>",
            ScalarType::Uuid => "Uuid",
            ScalarType::Json => "Value",
            ScalarType::Inet => "IpNetwork",
            ScalarType::MacAddr => "MacAddress",
            ScalarType::List(element) => return format!("Vec<{}>", Self::scalar_name(element)),
        };
        name.to_string()
    }

    fn scalar_imports(scalar: &ScalarType) -> Vec<&'static str> {
        match scalar {
            ScalarType::Decimal => vec!["rust_decimal::Decimal"],
            ScalarType::Money => vec!["sqlx::postgres::types::PgMoney"],
            ScalarType::Date => vec!["chrono::NaiveDate"],
            ScalarType::Time => vec!["chrono::NaiveTime"],
            ScalarType::TimeTz => vec!["sqlx::postgres::types::PgTimeTz"],
            ScalarType::Interval => vec!["sqlx::postgres::types::PgInterval"],
            ScalarType::Timestamp => vec!["chrono::NaiveDateTime"],
            ScalarType::TimestampTz => vec!["chrono::DateTime", "chrono::Utc"],
            ScalarType::Uuid => vec!["uuid::Uuid"],
            ScalarType::Json => vec!["serde_json::Value"],
            ScalarType::Inet => vec!["ipnetwork::IpNetwork"],
            ScalarType::MacAddr => vec!["mac_address::MacAddress"],
            ScalarType::List(element) => Self::scalar_imports(element),
            _ => Vec::new(),
        }
    }

    /// The sqlx wrapper types implement neither `Serialize` nor `Deserialize`.
    fn has_serde(scalar: &ScalarType) -> bool {
        match scalar {
            ScalarType::Money | ScalarType::TimeTz | ScalarType::Interval => false,
            ScalarType::List(element) => Self::has_serde(element),
            _ => true,
        }
    }

    /// snake_case field names in field order, unique within the struct and
    /// escaped where they collide with a keyword.
    ///
    /// Distinct PascalCase identifiers can share a snake_case form
    /// (`UserID` and `UserId`); later ones get a numeric suffix.
    pub fn field_names(def: &StructDef) -> Vec<String> {
        let mut seen = HashSet::with_capacity(def.fields.len());
        def.fields
            .iter()
            .map(|field| {
                let base = ident::to_snake_case(&field.ident);
                let name = ident::unique(&base, &mut seen);
                if name != base {
                    tracing::warn!(
                        table = %def.table,
                        column = %field.tag.column,
                        field = %name,
                        "snake_case field collision, suffix appended"
                    );
                }
                escape_keyword(name)
            })
            .collect()
    }

    pub fn type_ident(def: &StructDef) -> String {
        let ident = def.ident.as_str();
        if NON_RAW.contains(&ident) || RESERVED_TYPES.contains(&ident) {
            format!("{ident}{TYPE_SUFFIX}")
        } else {
            def.ident.clone()
        }
    }

    fn field_doc(field: &FieldDef) -> String {
        let mut doc = format!("`{}` {}", field.tag.column, field.tag.sql_type);
        if let ScalarType::Raw(sql) = &field.ty.scalar {
            let column = &field.tag.column;
            let _ = write!(doc, " (unsupported type `{sql}`, select it as `{column}::text`)");
        }
        if field.tag.primary_key {
            doc.push_str(", primary key");
        }
        if field.tag.nullable {
            doc.push_str(", nullable");
        }
        doc
    }

    fn columns_where(def: &StructDef, pred: impl Fn(&FieldDef) -> bool) -> String {
        def.fields
            .iter()
            .filter(|&f| pred(f))
            .map(|f| format!("`{}`", f.tag.column))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn escape_keyword(name: String) -> String {
    if NON_RAW.contains(&name.as_str()) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

impl Renderer for RustRenderer {
    fn extension(&self) -> &'static str {
        "rs"
    }

    fn type_name(&self, ty: &TypeDescriptor) -> String {
        let base = Self::scalar_name(&ty.scalar);
        if ty.nullable {
            format!("Option<{base}>")
        } else {
            base
        }
    }

    fn type_imports(&self, ty: &TypeDescriptor) -> Vec<&'static str> {
        Self::scalar_imports(&ty.scalar)
    }

    fn struct_imports(&self, def: &StructDef) -> Vec<&'static str> {
        let derives = Derives::of(def);
        let mut imports = Vec::new();
        if derives.serde {
            imports.extend(["serde::Deserialize", "serde::Serialize"]);
        }
        if derives.from_row {
            imports.push("sqlx::FromRow");
        }
        imports
    }

    fn header(&self, package: &str, imports: &BTreeSet<&'static str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "//! `{package}`: structs generated from the database schema.");
        out.push_str("//!\n");
        out.push_str("//! Generated by schema2struct. Do not edit by hand.\n");
        if !imports.is_empty() {
            out.push('\n');
            for import in imports {
                let _ = writeln!(out, "use {import};");
            }
        }
        out
    }

    fn render_struct(&self, def: &StructDef) -> String {
        let derives = Derives::of(def);
        let mut out = String::new();
        let _ = writeln!(out, "/// Row of table `{}`.", def.table);
        if !derives.from_row {
            out.push_str("///\n");
            let _ = writeln!(
                out,
                "/// No `FromRow`: sqlx cannot decode {}.",
                Self::columns_where(def, |f| f.ty.is_raw())
            );
        }
        if !derives.serde {
            out.push_str("///\n");
            let _ = writeln!(
                out,
                "/// No serde derives: the types of {} do not implement them.",
                Self::columns_where(def, |f| !Self::has_serde(&f.ty.scalar))
            );
        }
        let _ = writeln!(out, "{}", derives.attribute());
        let _ = writeln!(out, "pub struct {} {{", Self::type_ident(def));
        for (field, name) in def.fields.iter().zip(Self::field_names(def)) {
            let column = &field.tag.column;
            let _ = writeln!(out, "    /// {}", Self::field_doc(field));
            if derives.serde {
                let _ = writeln!(out, "    #[serde(rename = \"{column}\")]");
            }
            if derives.from_row {
                let _ = writeln!(out, "    #[sqlx(rename = \"{column}\")]");
            }
            let _ = writeln!(out, "    pub {name}: {},", self.type_name(&field.ty));
        }
        out.push_str("}\n");
        out
    }
}
