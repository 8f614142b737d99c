//! core
//!
//! The document engine shared by every entity kind.
//!
//! # Modules
//!
//! - [`value`] - The closed `Value` tree all documents are expressed in
//! - [`types`] - Strong types: ApplicationTag, UnitTag, MachineTag, etc.
//! - [`schema`] - Declarative field schemas and the path-qualified checker
//! - [`dispatch`] - Per-entity version tables and the import driver
//! - [`verify`] - Semantic validation of constructed entities
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid identifiers at construction
//! - Schemas are static data, never code
//! - Import is pure: the same document always yields the same entities

pub mod config;
pub mod dispatch;
pub mod schema;
pub mod types;
pub mod value;
pub mod verify;
