use async_trait::async_trait;
use roster_db::StoreError;

use super::model::{NewStudent, Student};

/// Storage contract for student records.
///
/// Every method maps to exactly one statement against the store.
#[async_trait]
pub trait StudentsRepository: Send + Sync {
    /// All records ordered ascending by `roll`.
    async fn list(&self) -> Result<Vec<Student>, StoreError>;

    async fn find(&self, id: i32) -> Result<Option<Student>, StoreError>;

    async fn insert(&self, new: NewStudent) -> Result<Student, StoreError>;

    /// Replace all mutable fields; `None` when no row has `id`.
    async fn update(&self, id: i32, new: NewStudent) -> Result<Option<Student>, StoreError>;

    /// `false` when no row has `id`.
    async fn delete(&self, id: i32) -> Result<bool, StoreError>;
}
