//! Wiring of stores, encoder and services.

use std::sync::Arc;

use domain::{Argon2PasswordEncoder, PasswordEncoder};
use sea_orm::DatabaseConnection;

use super::{
    CourseManager, CourseService, CredentialsAuthenticator, CredentialsProvider, StudentManager,
    StudentService,
};
use crate::repository::{
    CourseRepository, CourseStore, InMemoryCourseStore, InMemoryStudentStore, StudentRepository,
    StudentStore,
};

/// Handles to every service, sharing one set of stores.
#[derive(Clone)]
pub struct Services {
    students: Arc<StudentManager>,
    courses: Arc<dyn CourseService>,
    authenticator: Arc<CredentialsAuthenticator>,
}

impl Services {
    /// Wire services over arbitrary store implementations.
    pub fn new(
        students: Arc<dyn StudentRepository>,
        courses: Arc<dyn CourseRepository>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        let course_service: Arc<dyn CourseService> = Arc::new(CourseManager::new(courses.clone()));
        let student_service = Arc::new(StudentManager::new(
            students,
            courses,
            course_service.clone(),
            encoder.clone(),
        ));
        let authenticator = Arc::new(CredentialsAuthenticator::new(
            student_service.clone(),
            encoder,
        ));

        Self {
            students: student_service,
            courses: course_service,
            authenticator,
        }
    }

    /// PostgreSQL-backed services with Argon2 password encoding.
    pub fn from_connection(db: Arc<DatabaseConnection>) -> Self {
        Self::new(
            Arc::new(StudentStore::new(Arc::clone(&db))),
            Arc::new(CourseStore::new(db)),
            Arc::new(Argon2PasswordEncoder::new()),
        )
    }

    /// Services over in-memory stores.
    pub fn in_memory(courses: InMemoryCourseStore, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self::new(Arc::new(InMemoryStudentStore::new()), Arc::new(courses), encoder)
    }

    pub fn students(&self) -> Arc<dyn StudentService> {
        self.students.clone()
    }

    pub fn courses(&self) -> Arc<dyn CourseService> {
        self.courses.clone()
    }

    pub fn credentials(&self) -> Arc<dyn CredentialsProvider> {
        self.students.clone()
    }

    pub fn authenticator(&self) -> Arc<CredentialsAuthenticator> {
        self.authenticator.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::entities::course;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_from_connection_shares_one_pool() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course::Model {
                id: 1,
                name: "Web Programming".to_string(),
            }]])
            .into_connection();

        let services = Services::from_connection(Arc::new(db));
        let course = services.courses().find_by_id(1).await.unwrap();

        assert_eq!(course.name, "Web Programming");
    }
}
