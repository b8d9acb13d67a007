#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use roster_db::StoreError;
    use std::sync::{Arc, Mutex};

    use super::super::model::{NewStudent, Student};

    /// In-memory repository honoring the store's uniqueness and ordering rules.
    #[derive(Default)]
    struct MockRepository {
        rows: Mutex<Vec<Student>>,
        next_id: Mutex<i32>,
        fail_with: Option<StoreError>,
    }

    impl MockRepository {
        fn failing(err: StoreError) -> Self {
            Self {
                fail_with: Some(err),
                ..Default::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            self.fail_with.clone().map_or(Ok(()), Err)
        }
    }

    #[async_trait]
    impl repo::StudentsRepository for MockRepository {
        async fn list(&self) -> Result<Vec<Student>, StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by_key(|s| s.roll);
            Ok(rows)
        }

        async fn find(&self, id: i32) -> Result<Option<Student>, StoreError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
        }

        async fn insert(&self, new: NewStudent) -> Result<Student, StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|s| s.roll == new.roll) {
                return Err(StoreError::Conflict("students.roll".to_owned()));
            }
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let student = Student {
                id: *next_id,
                roll: new.roll,
                name: new.name,
                class_name: new.class_name,
            };
            rows.push(student.clone());
            Ok(student)
        }

        async fn update(&self, id: i32, new: NewStudent) -> Result<Option<Student>, StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|s| s.roll == new.roll && s.id != id) {
                return Err(StoreError::Conflict("students.roll".to_owned()));
            }
            Ok(rows.iter_mut().find(|s| s.id == id).map(|s| {
                s.roll = new.roll;
                s.name = new.name;
                s.class_name = new.class_name;
                s.clone()
            }))
        }

        async fn delete(&self, id: i32) -> Result<bool, StoreError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|s| s.id != id);
            Ok(rows.len() != before)
        }
    }

    fn new_student(roll: i32, name: &str, class_name: &str) -> NewStudent {
        NewStudent {
            roll,
            name: name.to_owned(),
            class_name: class_name.to_owned(),
        }
    }

    fn service_with(repo: MockRepository) -> service::Service {
        service::Service::new(Arc::new(repo), service::ServiceConfig::default())
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let service = service_with(MockRepository::default());

        let created = service
            .create_student(new_student(1, "Alice", "10A"))
            .await
            .unwrap();
        let fetched = service.get_student(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.roll, 1);
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.class_name, "10A");
    }

    #[tokio::test]
    async fn test_duplicate_roll_is_reported() {
        let service = service_with(MockRepository::default());
        service
            .create_student(new_student(7, "Alice", "10A"))
            .await
            .unwrap();

        let err = service
            .create_student(new_student(7, "Bob", "10B"))
            .await
            .unwrap_err();
        assert!(matches!(err, error::DomainError::DuplicateRoll { roll: 7 }));
    }

    #[tokio::test]
    async fn test_list_is_sorted_by_roll() {
        let service = service_with(MockRepository::default());
        for roll in [3, 1, 2] {
            service
                .create_student(new_student(roll, "S", "1"))
                .await
                .unwrap();
        }

        let rolls: Vec<i32> = service
            .list_students()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.roll)
            .collect();
        assert_eq!(rolls, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found_and_changes_nothing() {
        let service = service_with(MockRepository::default());
        let existing = service
            .create_student(new_student(1, "Alice", "10A"))
            .await
            .unwrap();

        let err = service
            .update_student(existing.id + 100, new_student(2, "Ghost", "0"))
            .await
            .unwrap_err();
        assert!(matches!(err, error::DomainError::NotFound));

        let all = service.list_students().await.unwrap();
        assert_eq!(all, vec![existing]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let service = service_with(MockRepository::default());
        let created = service
            .create_student(new_student(1, "Alice", "10A"))
            .await
            .unwrap();

        let updated = service
            .update_student(created.id, new_student(5, "Alice B", "11C"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.roll, 5);
        assert_eq!(updated.name, "Alice B");
        assert_eq!(updated.class_name, "11C");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service_with(MockRepository::default());
        let created = service
            .create_student(new_student(1, "Alice", "10A"))
            .await
            .unwrap();

        service.delete_student(created.id).await.unwrap();

        let err = service.get_student(created.id).await.unwrap_err();
        assert!(matches!(err, error::DomainError::NotFound));
        let err = service.delete_student(created.id).await.unwrap_err();
        assert!(matches!(err, error::DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let service = service_with(MockRepository::default());

        let err = service
            .create_student(new_student(1, "   ", "10A"))
            .await
            .unwrap_err();
        match err {
            error::DomainError::Validation { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_class_is_rejected() {
        let service = service_with(MockRepository::default());
        let long_class = "x".repeat(51);

        let err = service
            .create_student(new_student(1, "Alice", &long_class))
            .await
            .unwrap_err();
        match err {
            error::DomainError::Validation { field, message } => {
                assert_eq!(field, "class");
                assert!(message.contains("50"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_errors_are_classified() {
        let service = service_with(MockRepository::failing(StoreError::Unavailable(
            "pool timed out".to_owned(),
        )));
        let err = service.list_students().await.unwrap_err();
        assert!(matches!(err, error::DomainError::Unavailable(msg) if msg == "pool timed out"));

        let service = service_with(MockRepository::failing(StoreError::Unknown(
            "syntax error".to_owned(),
        )));
        let err = service.get_student(1).await.unwrap_err();
        assert!(matches!(err, error::DomainError::Internal(msg) if msg == "syntax error"));
    }
}
