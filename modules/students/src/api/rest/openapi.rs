//! OpenAPI document for the student routes.
//!
//! Built with the `utoipa` builders so paths stay in one table next to
//! [`routes`](super::routes); DTO schemas come from their `ToSchema` derives.

use utoipa::openapi::{
    OpenApi, OpenApiBuilder, Ref, RefOr, Required,
    content::{Content, ContentBuilder},
    info::InfoBuilder,
    path::{
        HttpMethod, OperationBuilder, Parameter, ParameterBuilder, ParameterIn, PathItemBuilder,
        PathsBuilder,
    },
    request_body::RequestBodyBuilder,
    response::{Response, ResponseBuilder, ResponsesBuilder},
    schema::{ComponentsBuilder, Schema},
};
use utoipa::{PartialSchema, ToSchema};

use super::dto::{ErrorDto, MessageDto, StudentDto, StudentRequest};
use super::routes::{STUDENT_PATH, STUDENTS_PATH};

const TAG: &str = "Students";
const APPLICATION_JSON: &str = "application/json";

fn json(schema: impl Into<RefOr<Schema>>) -> Content {
    ContentBuilder::new().schema(Some(schema)).build()
}

fn schema_ref<T: ToSchema>() -> RefOr<Schema> {
    RefOr::Ref(Ref::from_schema_name(T::name()))
}

fn ok(description: &str, schema: RefOr<Schema>) -> Response {
    ResponseBuilder::new()
        .description(description)
        .content(APPLICATION_JSON, json(schema))
        .build()
}

fn error(description: &str) -> Response {
    ok(description, schema_ref::<ErrorDto>())
}

fn id_param() -> Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some("Store-assigned student id"))
        .schema(Some(i32::schema()))
        .build()
}

fn student_body() -> Option<utoipa::openapi::request_body::RequestBody> {
    Some(
        RequestBodyBuilder::new()
            .description(Some("Student fields; all three are required"))
            .content(APPLICATION_JSON, json(schema_ref::<StudentRequest>()))
            .required(Some(Required::True))
            .build(),
    )
}

fn register<T: ToSchema>(mut components: ComponentsBuilder) -> ComponentsBuilder {
    let mut collected = vec![(T::name().into_owned(), <T as PartialSchema>::schema())];
    T::schemas(&mut collected);
    for (name, schema) in collected {
        components = components.schema(name, schema);
    }
    components
}

/// Build the OpenAPI 3 document served at `/openapi.json`.
#[must_use]
pub fn openapi() -> OpenApi {
    let list = OperationBuilder::new()
        .operation_id(Some("students.list"))
        .summary(Some("List students ordered by roll"))
        .tag(TAG)
        .responses(
            ResponsesBuilder::new()
                .response("200", ok("All students", Vec::<StudentDto>::schema()))
                .response("500", error("Store error"))
                .response("503", error("Store unavailable or service not ready"))
                .build(),
        );

    let create = OperationBuilder::new()
        .operation_id(Some("students.create"))
        .summary(Some("Create a student"))
        .tag(TAG)
        .request_body(student_body())
        .responses(
            ResponsesBuilder::new()
                .response("201", ok("Created student", schema_ref::<StudentDto>()))
                .response("400", error("Missing or malformed field"))
                .response("409", error("Roll already taken"))
                .response("500", error("Store error"))
                .build(),
        );

    let get = OperationBuilder::new()
        .operation_id(Some("students.get"))
        .summary(Some("Get a student by id"))
        .tag(TAG)
        .parameter(id_param())
        .responses(
            ResponsesBuilder::new()
                .response("200", ok("Student", schema_ref::<StudentDto>()))
                .response("400", error("Invalid id"))
                .response("404", error("Student not found"))
                .response("500", error("Store error"))
                .build(),
        );

    let update = OperationBuilder::new()
        .operation_id(Some("students.update"))
        .summary(Some("Replace roll, name and class of a student"))
        .tag(TAG)
        .parameter(id_param())
        .request_body(student_body())
        .responses(
            ResponsesBuilder::new()
                .response("200", ok("Updated student", schema_ref::<StudentDto>()))
                .response("400", error("Missing or malformed field"))
                .response("404", error("Student not found"))
                .response("409", error("Roll already taken"))
                .response("500", error("Store error"))
                .build(),
        );

    let delete = OperationBuilder::new()
        .operation_id(Some("students.delete"))
        .summary(Some("Delete a student"))
        .tag(TAG)
        .parameter(id_param())
        .responses(
            ResponsesBuilder::new()
                .response("200", ok("Deletion confirmation", schema_ref::<MessageDto>()))
                .response("404", error("Student not found"))
                .response("500", error("Store error"))
                .build(),
        );

    let paths = PathsBuilder::new()
        .path(
            STUDENTS_PATH,
            PathItemBuilder::new()
                .operation(HttpMethod::Get, list.build())
                .operation(HttpMethod::Post, create.build())
                .build(),
        )
        .path(
            // OpenAPI and axum 0.8 share the `{id}` placeholder syntax.
            STUDENT_PATH,
            PathItemBuilder::new()
                .operation(HttpMethod::Get, get.build())
                .operation(HttpMethod::Put, update.build())
                .operation(HttpMethod::Delete, delete.build())
                .build(),
        );

    let mut components = ComponentsBuilder::new();
    components = register::<StudentDto>(components);
    components = register::<StudentRequest>(components);
    components = register::<MessageDto>(components);
    components = register::<ErrorDto>(components);

    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Roster API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Student records CRUD service"))
                .build(),
        )
        .paths(paths.build())
        .components(Some(components.build()))
        .build()
}
