//! Repository layer for data access.
//!
//! Each store contract has one implementation per storage technology:
//! PostgreSQL through SeaORM and an in-memory map.

mod course_repository;
pub mod entities;
mod memory;
mod student_repository;

pub use course_repository::{CourseRepository, CourseStore};
pub use memory::{InMemoryCourseStore, InMemoryStudentStore};
pub use student_repository::{StudentRepository, StudentStore};

#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::MockCourseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use student_repository::MockStudentRepository;
