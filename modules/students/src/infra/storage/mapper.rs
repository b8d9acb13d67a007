use crate::domain::model::Student;

use super::entity;

impl From<entity::Model> for Student {
    fn from(entity: entity::Model) -> Self {
        Self {
            id: entity.id,
            roll: entity.roll,
            name: entity.name,
            class_name: entity.class_name,
        }
    }
}
