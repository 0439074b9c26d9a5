//! Student domain entity and related types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{TYPE_MASTER, TYPE_PHD, TYPE_STUDENT, VALID_STUDENT_TYPES};
use crate::course::{Course, CourseId};
use crate::error::DomainError;

/// Student identifier assigned by the student store.
pub type StudentId = i64;

/// Student category. Its name doubles as the authentication role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StudentType {
    Student,
    Master,
    Phd,
}

impl StudentType {
    /// Canonical upper-case name, as stored and as used for roles
    pub fn name(&self) -> &'static str {
        match self {
            StudentType::Student => TYPE_STUDENT,
            StudentType::Master => TYPE_MASTER,
            StudentType::Phd => TYPE_PHD,
        }
    }
}

impl FromStr for StudentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TYPE_STUDENT => Ok(StudentType::Student),
            TYPE_MASTER => Ok(StudentType::Master),
            TYPE_PHD => Ok(StudentType::Phd),
            other => Err(DomainError::validation(format!(
                "Unknown student type: {} (expected one of {})",
                other,
                VALID_STUDENT_TYPES.join(", ")
            ))),
        }
    }
}

impl From<StudentType> for String {
    fn from(student_type: StudentType) -> Self {
        student_type.name().to_string()
    }
}

impl fmt::Display for StudentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Student domain entity
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Login username, unique across students
    pub email: String,
    /// Encoded password, never the plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub student_type: StudentType,
    pub courses: Vec<Course>,
    pub enrollment_date: NaiveDate,
}

// Keep the hash out of logs
impl fmt::Debug for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Student")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("student_type", &self.student_type)
            .field("courses", &self.courses)
            .field("enrollment_date", &self.enrollment_date)
            .finish()
    }
}

impl Student {
    /// Check if the student is enrolled in the given course
    pub fn attends(&self, course_id: CourseId) -> bool {
        self.courses.iter().any(|c| c.id == course_id)
    }

    /// Check if the student enrolled strictly before `date`
    pub fn enrolled_before(&self, date: NaiveDate) -> bool {
        self.enrollment_date < date
    }

    /// Ids of the enrolled courses, in association order
    pub fn course_ids(&self) -> Vec<CourseId> {
        self.courses.iter().map(|c| c.id).collect()
    }

    /// Replace every field except the identity.
    ///
    /// The course set is replaced as a whole, never merged.
    pub fn overwrite(&mut self, details: NewStudent) {
        self.name = details.name;
        self.email = details.email;
        self.password = details.password;
        self.student_type = details.student_type;
        self.courses = details.courses;
        self.enrollment_date = details.enrollment_date;
    }
}

/// A student that has not been persisted yet. The store assigns the id.
#[derive(Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    /// Encoded password
    pub password: String,
    pub student_type: StudentType,
    pub courses: Vec<Course>,
    pub enrollment_date: NaiveDate,
}

impl fmt::Debug for NewStudent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStudent")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("student_type", &self.student_type)
            .field("courses", &self.courses)
            .field("enrollment_date", &self.enrollment_date)
            .finish()
    }
}

impl NewStudent {
    /// Attach the identity assigned by a store
    pub fn with_id(self, id: StudentId) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            password: self.password,
            student_type: self.student_type,
            courses: self.courses,
            enrollment_date: self.enrollment_date,
        }
    }
}

/// Student create/update data transfer object.
///
/// Update uses the same shape: every field is replaced.
#[derive(Clone, Deserialize)]
pub struct StudentInput {
    /// Display name
    pub name: String,
    /// Email address, used as login username
    pub email: String,
    /// Plaintext password, encoded before storage
    pub password: String,
    /// Student category
    #[serde(rename = "type")]
    pub student_type: StudentType,
    /// Courses to enroll in; unknown ids are ignored
    #[serde(default)]
    pub course_ids: Vec<CourseId>,
    /// Date of enrollment
    pub enrollment_date: NaiveDate,
}

impl fmt::Debug for StudentInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StudentInput")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("student_type", &self.student_type)
            .field("course_ids", &self.course_ids)
            .field("enrollment_date", &self.enrollment_date)
            .finish()
    }
}

/// Student response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub student_type: StudentType,
    pub courses: Vec<Course>,
    pub enrollment_date: NaiveDate,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            email: student.email,
            student_type: student.student_type,
            courses: student.courses,
            enrollment_date: student.enrollment_date,
        }
    }
}

impl From<&Student> for StudentResponse {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            student_type: student.student_type,
            courses: student.courses.clone(),
            enrollment_date: student.enrollment_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ana() -> Student {
        Student {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
            password: "hash".to_string(),
            student_type: StudentType::Student,
            courses: vec![Course::new(1, "Web Programming")],
            enrollment_date: date(2020, 1, 1),
        }
    }

    #[test]
    fn test_student_type_names_round_trip() {
        for name in VALID_STUDENT_TYPES {
            let parsed: StudentType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), *name);
        }
    }

    #[test]
    fn test_unknown_student_type_rejected() {
        let result = "student".parse::<StudentType>();
        match result {
            Err(DomainError::Validation(msg)) => {
                assert!(msg.contains("student"));
                assert!(msg.contains("STUDENT, MASTER, PHD"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_student_type_serializes_upper_case() {
        let json = serde_json::to_string(&StudentType::Phd).unwrap();
        assert_eq!(json, "\"PHD\"");
    }

    #[test]
    fn test_overwrite_replaces_courses() {
        let mut student = ana();
        student.overwrite(NewStudent {
            name: "Ana M".to_string(),
            email: "ana.m@x.com".to_string(),
            password: "other-hash".to_string(),
            student_type: StudentType::Master,
            courses: vec![Course::new(2, "Databases")],
            enrollment_date: date(2021, 9, 1),
        });

        assert_eq!(student.id, 1);
        assert_eq!(student.name, "Ana M");
        assert_eq!(student.course_ids(), vec![2]);
        assert!(!student.attends(1));
        assert_eq!(student.student_type, StudentType::Master);
    }

    #[test]
    fn test_enrolled_before_is_strict() {
        let student = ana();
        assert!(student.enrolled_before(date(2020, 1, 2)));
        assert!(!student.enrolled_before(date(2020, 1, 1)));
    }

    #[test]
    fn test_password_not_serialized_or_debugged() {
        let student = ana();
        let json = serde_json::to_string(&student).unwrap();
        assert!(!json.contains("hash"));
        assert!(format!("{:?}", student).contains("[REDACTED]"));
    }

    #[test]
    fn test_response_uses_type_key() {
        let response = StudentResponse::from(&ana());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["type"], "STUDENT");
        assert_eq!(json["enrollment_date"], "2020-01-01");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_input_deserializes_without_courses() {
        let input: StudentInput = serde_json::from_str(
            r#"{"name":"Ana","email":"ana@x.com","password":"pw1","type":"STUDENT","enrollment_date":"2020-01-01"}"#,
        )
        .unwrap();

        assert!(input.course_ids.is_empty());
        assert_eq!(input.student_type, StudentType::Student);
    }
}
