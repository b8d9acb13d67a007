//! Student records module.
//!
//! Layers, innermost first:
//! - [`domain`]: the `Student` model, validation and the repository contract,
//! - [`infra`]: the repository backed by the persistence gateway,
//! - [`api`]: REST DTOs, handlers, routes and the OpenAPI document.

pub mod api;
pub mod domain;
pub mod infra;

pub use api::rest::openapi::openapi;
pub use api::rest::routes::router;
pub use domain::model::{NewStudent, Student};
pub use domain::service::{Service, ServiceConfig};
pub use infra::storage::gateway_repo::GatewayStudentsRepository;
pub use infra::storage::schema::students_table;
