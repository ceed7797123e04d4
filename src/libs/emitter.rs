//! Artifact rendering: package header, imports and struct bodies.

use std::collections::BTreeSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::libs::assembler::StructDef;
use crate::libs::renderer::Renderer;

/// File stem of the combined artifact.
pub const COMBINED_STEM: &str = "models";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// All structs in a single `models.<ext>`.
    #[default]
    Combined,
    /// One file per table.
    Separate,
    /// Both of the above.
    Both,
}

impl Mode {
    pub fn separate(self) -> bool {
        matches!(self, Mode::Separate | Mode::Both)
    }

    pub fn combined(self) -> bool {
        matches!(self, Mode::Combined | Mode::Both)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Combined => "combined",
            Mode::Separate => "separate",
            Mode::Both => "both",
        };
        f.write_str(s)
    }
}

/// One independently writable output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub body: String,
}

pub struct Emitter {
    renderer: &'static dyn Renderer,
    package: String,
}

impl Emitter {
    pub fn new(renderer: &'static dyn Renderer, package: impl Into<String>) -> Self {
        Self {
            renderer,
            package: package.into(),
        }
    }

    /// Sorted, deduplicated imports used by `defs`.
    pub fn imports<'a>(&self, defs: impl IntoIterator<Item = &'a StructDef>) -> BTreeSet<&'static str> {
        let mut imports = BTreeSet::new();
        for def in defs {
            imports.extend(self.renderer.struct_imports(def));
            for ty in def.types() {
                imports.extend(self.renderer.type_imports(ty));
            }
        }
        imports
    }

    /// Renders every mode-selected artifact: per-table files first, then
    /// the combined one.
    pub fn render(&self, mode: Mode, defs: &[StructDef]) -> Vec<Artifact> {
        let mut artifacts = Vec::new();
        if mode.separate() {
            artifacts.extend(self.render_separate(defs));
        }
        if mode.combined() {
            artifacts.extend(self.render_combined(defs));
        }
        artifacts
    }

    /// `None` when there is nothing to combine.
    pub fn render_combined(&self, defs: &[StructDef]) -> Option<Artifact> {
        if defs.is_empty() {
            return None;
        }
        let bodies: Vec<String> = defs.iter().map(|d| self.renderer.render_struct(d)).collect();
        Some(Artifact {
            name: format!("{COMBINED_STEM}.{}", self.renderer.extension()),
            body: self.document(self.imports(defs), &bodies),
        })
    }

    pub fn render_separate(&self, defs: &[StructDef]) -> Vec<Artifact> {
        defs.iter()
            .map(|def| Artifact {
                name: format!("{}.{}", def.table.to_lowercase(), self.renderer.extension()),
                body: self.document(
                    self.imports(std::iter::once(def)),
                    &[self.renderer.render_struct(def)],
                ),
            })
            .collect()
    }

    fn document(&self, imports: BTreeSet<&'static str>, bodies: &[String]) -> String {
        let mut out = self.renderer.header(&self.package, &imports);
        for body in bodies {
            out.push('\n');
            out.push_str(body);
        }
        out
    }
}
