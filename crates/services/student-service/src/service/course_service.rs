//! Course lookup service.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppResult, OptionExt};
use domain::{Course, CourseId};

use crate::repository::CourseRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Course service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Resolve a course id, failing with NotFound if it does not exist
    async fn find_by_id(&self, id: CourseId) -> AppResult<Course>;

    /// List every course
    async fn list_all(&self) -> AppResult<Vec<Course>>;
}

/// Concrete implementation of CourseService using repository.
pub struct CourseManager {
    repo: Arc<dyn CourseRepository>,
}

impl CourseManager {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CourseService for CourseManager {
    async fn find_by_id(&self, id: CourseId) -> AppResult<Course> {
        self.repo.find_by_id(id).await?.ok_or_not_found("Course")
    }

    async fn list_all(&self) -> AppResult<Vec<Course>> {
        self.repo.find_all().await
    }
}
