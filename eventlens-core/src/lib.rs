//! Core types for the eventlens ecosystem.
//!
//! This crate provides the pieces shared by the server and backend clients:
//! - `Event` and `Media` records as stored by the backend
//! - the access gate (`access`): session store, guard and password challenge
//! - `gallery` for turning stored media into signed, displayable items
//! - the `Backend` trait every backend client implements

pub mod access;
pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod gallery;
pub mod media;
pub mod storage_path;
pub mod upload;

#[cfg(test)]
mod testing;

pub use backend::{Backend, ImageTransform};
pub use crate::config::EventLensConfig;
pub use error::{EventLensError, EventLensResult};
pub use event::Event;
pub use media::{Media, MediaKind, NewMedia, ResolvedMedia};
