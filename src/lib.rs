//! model-description - Versioned serialization of cluster model descriptions
//!
//! Converts loosely typed, nested documents (maps, lists and scalars as
//! produced by any structured-data codec) into strongly typed entity graphs,
//! and back. Every collection in a document carries its own schema version;
//! importers accept every supported version and exporters always write the
//! latest one.
//!
//! # Architecture
//!
//! - [`core`] - Value model, schema checker, version dispatch, identity
//!   types, validation and configuration
//! - [`entities`] - Remote applications, units and everything they own,
//!   plus the [`EntityGraph`](entities::graph::EntityGraph) root
//!
//! # Correctness Invariants
//!
//! 1. `import(export(x)) == x` for every entity at the latest version
//! 2. Older document versions import into the same canonical types, with
//!    later fields defaulted
//! 3. Import never performs semantic validation; [`core::verify`] does
//! 4. Version tables are static and immutable
//!
//! # Example
//!
//! ```
//! use model_description::core::value::Value;
//! use model_description::entities::graph::EntityGraph;
//!
//! let doc = Value::from(serde_json::json!({
//!     "units": {"version": 2, "units": []},
//! }));
//! let graph = EntityGraph::import(&doc).unwrap();
//! assert_eq!(EntityGraph::import(&graph.export()).unwrap(), graph);
//! ```

pub mod core;
pub mod entities;
