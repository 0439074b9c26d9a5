//! SeaORM entities for the student schema.

pub mod course;
pub mod student;
pub mod student_course;
