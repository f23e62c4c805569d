//! Cardstack Card Compiler
//!
//! This crate turns declarative card definitions into fully resolved,
//! inheritance-aware compiled cards.
//!
//! # Architecture
//!
//! - **Cards are URL-addressed**: every cross-reference (parent card, field type)
//!   is an absolute card URL resolved through a [`builder::Builder`]
//! - **Fields are cards**: a field is typed by another compiled card, so primitive
//!   types like string and date are cards themselves
//! - **Single-parent adoption**: a card extends exactly one parent; the base card
//!   terminates every chain
//! - **No internal cache**: the compiler is a pure function of the raw card and the
//!   builder; memoization belongs to the builder
//!
//! # Modules
//!
//! - [`models`] - Raw and compiled card data structures
//! - [`config`] - Compiler configuration
//! - [`js`] - swc-backed parsing of card modules
//! - [`schema`] - Schema extraction from annotated class declarations
//! - [`template`] - Template rewriting and used-field analysis
//! - [`compiler`] - The compile orchestrator and inheritance rules
//! - [`builder`] - Collaborator traits plus a memoizing reference builder
//! - [`realm`] - Raw card sources (in-memory and directory-backed)

pub mod builder;
pub mod compiler;
pub mod config;
pub mod js;
pub mod models;
pub mod realm;
pub mod schema;
pub mod template;
pub mod utils;

// Re-export commonly used types
pub use builder::{Builder, BuilderError, CardBuilder, DefineModule, InMemoryModules};
pub use compiler::{CompileError, Compiler};
pub use config::CompilerConfig;
pub use models::*;
pub use realm::{DirectoryRealm, MemoryRealm, RawCardSource, RealmConfig};
