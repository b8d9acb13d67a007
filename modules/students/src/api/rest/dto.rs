use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::error::DomainError;
use crate::domain::model::{NewStudent, Student};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentDto {
    pub id: i32,
    pub roll: i32,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
}

impl From<Student> for StudentDto {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            roll: student.roll,
            name: student.name,
            class_name: student.class_name,
        }
    }
}

/// Body of create and update requests.
///
/// Fields are optional at the wire level so a missing one is reported by name
/// instead of as a generic parse failure.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StudentRequest {
    #[serde(default)]
    #[schema(value_type = i32)]
    pub roll: Option<RollInput>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "class")]
    pub class_name: Option<String>,
}

/// `roll` as sent by clients: a JSON integer, or a string holding one
/// (HTML form values arrive as strings).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RollInput {
    Number(i64),
    Text(String),
}

impl RollInput {
    fn parse(&self) -> Result<i32, DomainError> {
        let wide = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| DomainError::validation("roll", "must be an integer"))?,
        };
        i32::try_from(wide).map_err(|_| DomainError::validation("roll", "is out of range"))
    }
}

impl TryFrom<StudentRequest> for NewStudent {
    type Error = DomainError;

    fn try_from(req: StudentRequest) -> Result<Self, Self::Error> {
        let roll = req
            .roll
            .ok_or_else(|| DomainError::validation("roll", "is required"))?
            .parse()?;
        let name = req
            .name
            .ok_or_else(|| DomainError::validation("name", "is required"))?;
        let class_name = req
            .class_name
            .ok_or_else(|| DomainError::validation("class", "is required"))?;

        Ok(Self {
            roll,
            name,
            class_name,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    pub error: String,
}
