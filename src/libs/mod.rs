pub mod assembler;
pub mod catalog;
pub mod config;
pub mod emitter;
pub mod error;
pub mod go_renderer;
pub mod ident;
pub mod pipeline;
pub mod renderer;
pub mod rust_renderer;
pub mod schema;
pub mod types;
pub mod writer;

// Re-export them for easier access from main.rs
pub use assembler::{ColumnTag, FieldDef, StructDef, assemble};
pub use catalog::*;
pub use config::*;
pub use emitter::*;
pub use error::*;
pub use pipeline::*;
pub use renderer::*;
pub use schema::*;
pub use types::{ScalarType, SqlType, TypeDescriptor};
pub use writer::*;
