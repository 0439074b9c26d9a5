//! Service layer - business logic.

mod auth;
mod container;
mod course_service;
mod student_service;

pub use auth::{CredentialsAuthenticator, CredentialsProvider};
pub use container::Services;
pub use course_service::{CourseManager, CourseService};
pub use student_service::{enrollment_cutoff, StudentManager, StudentService};

#[cfg(any(test, feature = "test-utils"))]
pub use auth::MockCredentialsProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use course_service::MockCourseService;
#[cfg(any(test, feature = "test-utils"))]
pub use student_service::MockStudentService;
