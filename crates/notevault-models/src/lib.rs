//! Data models for notevault.
//!
//! Defines the types exchanged with the remote workspace service
//! (users, folders, notes, files) and the client-side navigation
//! types built on top of them (locations, breadcrumbs, timelines).
//!
//! This crate has no HTTP or storage dependencies; it is pure data
//! plus the small amount of logic that belongs to the data itself.

mod links;
mod location;
mod nullable;
mod responses;
mod timeline;
mod user;
mod workspace;

pub use links::*;
pub use location::*;
pub use responses::*;
pub use timeline::*;
pub use user::*;
pub use workspace::*;
