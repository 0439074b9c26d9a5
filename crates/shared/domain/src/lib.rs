//! Domain layer - Core business entities and value objects.
//!
//! This crate contains the student and course entities, the authentication
//! principal and password hashing. It has no persistence dependencies.

pub mod constants;
pub mod course;
pub mod error;
pub mod password;
pub mod principal;
pub mod student;

pub use constants::*;
pub use course::{Course, CourseId};
pub use error::{DomainError, DomainResult};
pub use password::{Argon2PasswordEncoder, Password, PasswordEncoder};
pub use principal::Principal;
pub use student::{NewStudent, Student, StudentId, StudentInput, StudentResponse, StudentType};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockPasswordEncoder;
