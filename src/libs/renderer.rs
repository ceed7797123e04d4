//! Rendering targets.

use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::libs::assembler::StructDef;
use crate::libs::go_renderer::GoRenderer;
use crate::libs::rust_renderer::RustRenderer;
use crate::libs::types::TypeDescriptor;

/// Turns assembled struct definitions into source text for one language.
pub trait Renderer: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// Spelling of a field type, nullable wrapper included.
    fn type_name(&self, ty: &TypeDescriptor) -> String;

    /// Imports a field of this type needs.
    fn type_imports(&self, ty: &TypeDescriptor) -> Vec<&'static str>;

    /// Imports the struct itself needs beyond its field types (derives).
    fn struct_imports(&self, _def: &StructDef) -> Vec<&'static str> {
        Vec::new()
    }

    /// Package header followed by the import block.
    fn header(&self, package: &str, imports: &BTreeSet<&'static str>) -> String;

    fn render_struct(&self, def: &StructDef) -> String;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Rust,
    Go,
}

impl Language {
    pub fn renderer(self) -> &'static dyn Renderer {
        match self {
            Language::Rust => &RustRenderer,
            Language::Go => &GoRenderer,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Rust => f.write_str("rust"),
            Language::Go => f.write_str("go"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::types::map_name;

    const VOCABULARY: &[&str] = &[
        "smallint", "integer", "bigint", "serial", "real", "double precision", "numeric",
        "money", "boolean", "text", "character varying", "character", "citext", "inet",
        "cidr", "macaddr", "xml", "interval", "date", "time with time zone", "timestamp without time zone",
        "timestamp with time zone", "bytea", "uuid", "json", "jsonb", "integer[]", "ARRAY",
        "USER-DEFINED", "tsvector", "",
    ];

    #[test]
    fn every_type_has_a_spelling_in_every_language() {
        for language in [Language::Rust, Language::Go] {
            let renderer = language.renderer();
            for name in VOCABULARY {
                for nullable in [false, true] {
                    let spelled = renderer.type_name(&map_name(name, nullable));
                    assert!(!spelled.is_empty(), "{language}: {name:?} nullable={nullable}");
                }
            }
        }
    }
}
