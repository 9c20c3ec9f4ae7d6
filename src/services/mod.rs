//! Core services: the object store gateways and the file manager built on
//! top of them.

pub mod content_type;
pub mod file_service;
pub mod memory_store;
pub mod object_store;
pub mod path;
pub mod projection;
pub mod s3_store;

#[cfg(test)]
pub mod testing;
