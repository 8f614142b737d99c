//! entities
//!
//! Canonical entity types with their version tables, importers and
//! exporters.
//!
//! # Ownership
//!
//! ```text
//! EntityGraph
//! ├── RemoteApplication
//! │   ├── RemoteEndpoint
//! │   ├── RemoteSpace
//! │   │   └── Subnet
//! │   └── Status
//! └── Unit
//!     ├── Status, StatusHistory
//!     ├── AgentTools | CloudContainer (Address)
//!     ├── UnitResource, Payload
//!     └── Constraints
//! ```
//!
//! Ownership is a tree. The only cross-links are unit principal and
//! subordinate tags, which [`graph::EntityGraph`] resolves.

pub mod agent_tools;
pub mod cloud_container;
pub mod constraints;
pub mod endpoint;
pub mod graph;
pub mod payload;
pub mod remote_application;
pub mod resource;
pub mod space;
pub mod status;
pub mod subnet;
pub mod unit;
