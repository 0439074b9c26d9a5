//! Student database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use common::AppResult;
use domain::{Course, NewStudent, Student, StudentType};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub student_type: String,
    pub enrollment_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::student_course::Entity")]
    StudentCourse,
}

impl Related<super::student_course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCourse.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::student_course::Relation::Course.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::student_course::Relation::Student.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert a row plus its associated courses to the domain entity.
    ///
    /// Fails if the stored type name is not a known student type.
    pub fn into_student(self, courses: Vec<super::course::Model>) -> AppResult<Student> {
        let student_type: StudentType = self.student_type.parse()?;
        Ok(Student {
            id: self.id,
            name: self.name,
            email: self.email,
            password: self.password,
            student_type,
            courses: courses.into_iter().map(Course::from).collect(),
            enrollment_date: self.enrollment_date,
        })
    }
}

/// Row for a student not yet inserted; the database assigns the id.
impl From<&NewStudent> for ActiveModel {
    fn from(student: &NewStudent) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(student.name.clone()),
            email: Set(student.email.clone()),
            password: Set(student.password.clone()),
            student_type: Set(student.student_type.to_string()),
            enrollment_date: Set(student.enrollment_date),
        }
    }
}

/// Full-row update of an existing student.
impl From<&Student> for ActiveModel {
    fn from(student: &Student) -> Self {
        ActiveModel {
            id: Set(student.id),
            name: Set(student.name.clone()),
            email: Set(student.email.clone()),
            password: Set(student.password.clone()),
            student_type: Set(student.student_type.to_string()),
            enrollment_date: Set(student.enrollment_date),
        }
    }
}
