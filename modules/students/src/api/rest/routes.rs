use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::domain::service::Service;

use super::handlers;

pub const STUDENTS_PATH: &str = "/api/students";
pub const STUDENT_PATH: &str = "/api/students/{id}";

/// Student CRUD routes with the service attached as an extension.
#[must_use]
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route(
            STUDENTS_PATH,
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            STUDENT_PATH,
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .layer(Extension(service))
}
