//! Storage infrastructure for student records.

pub mod entity;
pub mod gateway_repo;
pub mod mapper;
pub mod schema;
