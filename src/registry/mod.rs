//! Local mirrors of the server-side data
//!
//! Registries are the only owners of cached server data. They do not expose their collections mutably:
//! every change goes through an operation that round-trips through a [`TaskServer`](crate::traits::TaskServer),
//! or through an `apply_*` function that merges a server reply.

pub mod categories;
pub mod tasks;

pub use categories::CategoryRegistry;
pub use tasks::{FetchTicket, TaskRegistry};
