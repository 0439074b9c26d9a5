//! Authentication principal built from a stored student.

use std::fmt;

use serde::Serialize;

use crate::constants::ROLE_PREFIX;
use crate::student::Student;

/// Identity handed to the authentication middleware: the login name, the
/// stored password hash and the role derived from the student type.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

impl Principal {
    /// Granted authorities, e.g. `ROLE_STUDENT`
    pub fn authorities(&self) -> Vec<String> {
        vec![format!("{}{}", ROLE_PREFIX, self.role)]
    }

    /// Check the role by name (with or without the `ROLE_` prefix)
    pub fn has_role(&self, role: &str) -> bool {
        let role = role.strip_prefix(ROLE_PREFIX).unwrap_or(role);
        self.role == role
    }
}

impl From<&Student> for Principal {
    fn from(student: &Student) -> Self {
        Self {
            username: student.email.clone(),
            password: student.password.clone(),
            role: student.student_type.name().to_string(),
        }
    }
}

impl From<Student> for Principal {
    fn from(student: Student) -> Self {
        let role = student.student_type.name().to_string();
        Self {
            username: student.email,
            password: student.password,
            role,
        }
    }
}
