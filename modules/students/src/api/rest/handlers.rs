use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::model::NewStudent;
use crate::domain::service::Service;

use super::dto::{MessageDto, StudentDto, StudentRequest};
use super::error::ApiResult;

pub async fn list_students(
    Extension(svc): Extension<Arc<Service>>,
) -> ApiResult<Json<Vec<StudentDto>>> {
    let students = svc.list_students().await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

pub async fn get_student(
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<StudentDto>> {
    let Path(id) = id?;
    let student = svc.get_student(id).await?;
    Ok(Json(student.into()))
}

pub async fn create_student(
    Extension(svc): Extension<Arc<Service>>,
    body: Result<Json<StudentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StudentDto>)> {
    let Json(req) = body?;
    let new = NewStudent::try_from(req)?;
    let student = svc.create_student(new).await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}

pub async fn update_student(
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<StudentRequest>, JsonRejection>,
) -> ApiResult<Json<StudentDto>> {
    let Path(id) = id?;
    let Json(req) = body?;
    let new = NewStudent::try_from(req)?;
    let student = svc.update_student(id, new).await?;
    Ok(Json(student.into()))
}

pub async fn delete_student(
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<MessageDto>> {
    let Path(id) = id?;
    svc.delete_student(id).await?;
    Ok(Json(MessageDto {
        message: "Student deleted".to_owned(),
    }))
}
