//! Host entity model for the key-value mirror.
//!
//! These types describe what the host application hands to the mirror: the
//! entities it owns ([`EntityRecord`]), their kind ([`EntityKind`]), its own
//! session ([`HostSession`]) and the boot-time entity set ([`HostSnapshot`]).
//!
//! # Modules
//!
//! - [`ids`] -- Textual entity identifier
//! - [`enums`] -- Entity kinds and their key/channel tags
//! - [`entity`] -- Generic field-map view of a host entity
//! - [`host`] -- Host session and startup snapshot
//! - [`error`] -- Construction errors

pub mod entity;
pub mod enums;
pub mod error;
pub mod host;
pub mod ids;

pub use entity::EntityRecord;
pub use enums::EntityKind;
pub use error::TypesError;
pub use host::{HostSession, HostSnapshot};
pub use ids::EntityId;
