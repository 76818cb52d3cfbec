//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures and traits
//! for the proxy configuration plane. All business crates depend only on this
//! crate, reverse dependencies are prohibited.
//!
//! ## Naming Model
//! - Every entity carries an immutable `name` used as its merge key
//! - Endpoints records share the name of the service they back

mod config;
mod entity;
mod error;
mod handler;
mod update;

pub use config::*;
pub use entity::*;
pub use error::*;
pub use handler::SnapshotHandler;
pub use update::*;
