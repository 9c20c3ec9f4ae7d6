//! Data models for the file manager.
//!
//! `object` mirrors what the object store reports. `file`, `folder` and
//! `statistics` are the projections served to the browser as JSON.

pub mod file;
pub mod folder;
pub mod object;
pub mod statistics;
