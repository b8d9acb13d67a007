use std::sync::Arc;

use super::error::DomainError;
use super::model::{NewStudent, Student};
use super::repo::StudentsRepository;

pub struct ServiceConfig {
    /// Column width of `name` in the store.
    pub max_name_len: usize,
    /// Column width of `class` in the store.
    pub max_class_len: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_len: 100,
            max_class_len: 50,
        }
    }
}

pub struct Service {
    repo: Arc<dyn StudentsRepository>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn StudentsRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    /// # Errors
    /// Returns a store-derived [`DomainError`].
    pub async fn list_students(&self) -> Result<Vec<Student>, DomainError> {
        let students = self.repo.list().await?;
        tracing::debug!(count = students.len(), "Listed students");
        Ok(students)
    }

    /// # Errors
    /// Returns [`DomainError::NotFound`] when no record has `id`.
    pub async fn get_student(&self, id: i32) -> Result<Student, DomainError> {
        self.repo.find(id).await?.ok_or(DomainError::NotFound)
    }

    /// # Errors
    /// Returns [`DomainError::Validation`] for blank or oversized fields and
    /// [`DomainError::DuplicateRoll`] when `roll` is taken.
    pub async fn create_student(&self, new: NewStudent) -> Result<Student, DomainError> {
        self.validate(&new)?;
        let roll = new.roll;
        let student = self
            .repo
            .insert(new)
            .await
            .map_err(|e| DomainError::from_write(e, roll))?;
        tracing::info!(id = student.id, roll = student.roll, "Student created");
        Ok(student)
    }

    /// Full replace of `roll`, `name` and `class`.
    ///
    /// # Errors
    /// Same as [`create_student`](Self::create_student), plus
    /// [`DomainError::NotFound`] when no record has `id`.
    pub async fn update_student(&self, id: i32, new: NewStudent) -> Result<Student, DomainError> {
        self.validate(&new)?;
        let roll = new.roll;
        let student = self
            .repo
            .update(id, new)
            .await
            .map_err(|e| DomainError::from_write(e, roll))?
            .ok_or(DomainError::NotFound)?;
        tracing::info!(id, roll, "Student updated");
        Ok(student)
    }

    /// # Errors
    /// Returns [`DomainError::NotFound`] when no record has `id`.
    pub async fn delete_student(&self, id: i32) -> Result<(), DomainError> {
        if self.repo.delete(id).await? {
            tracing::info!(id, "Student deleted");
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    fn validate(&self, new: &NewStudent) -> Result<(), DomainError> {
        Self::validate_text("name", &new.name, self.config.max_name_len)?;
        Self::validate_text("class", &new.class_name, self.config.max_class_len)
    }

    fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        if value.chars().count() > max_len {
            return Err(DomainError::validation(
                field,
                format!("exceeds maximum length of {max_len}"),
            ));
        }
        Ok(())
    }
}
