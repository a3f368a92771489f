use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, ResourceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceError {
    #[error("resource title cannot be empty")]
    EmptyTitle,

    #[error("unknown resource type: {0}")]
    UnknownType(String),
}

/// Kind of downloadable material attached to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Pdf,
    Link,
    File,
    Template,
}

impl ResourceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::Pdf => "pdf",
            ResourceType::Link => "link",
            ResourceType::File => "file",
            ResourceType::Template => "template",
        }
    }

    /// # Errors
    ///
    /// Returns `ResourceError::UnknownType` for unrecognised values.
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        match raw {
            "pdf" => Ok(Self::Pdf),
            "link" => Ok(Self::Link),
            "file" => Ok(Self::File),
            "template" => Ok(Self::Template),
            other => Err(ResourceError::UnknownType(other.to_owned())),
        }
    }
}

/// Supplementary material (guides, maps, templates) for a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseResource {
    id: ResourceId,
    course_id: CourseId,
    title: String,
    description: Option<String>,
    resource_type: ResourceType,
    file_url: Option<Url>,
    file_name: Option<String>,
    order: i32,
    created_at: DateTime<Utc>,
}

impl CourseResource {
    /// # Errors
    ///
    /// Returns `ResourceError::EmptyTitle` if the title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ResourceId,
        course_id: CourseId,
        title: impl Into<String>,
        description: Option<String>,
        resource_type: ResourceType,
        file_url: Option<Url>,
        file_name: Option<String>,
        order: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ResourceError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(ResourceError::EmptyTitle);
        }
        Ok(Self {
            id,
            course_id,
            title,
            description,
            resource_type,
            file_url,
            file_name,
            order,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ResourceId {
        self.id
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    #[must_use]
    pub fn file_url(&self) -> Option<&Url> {
        self.file_url.as_ref()
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[must_use]
    pub fn order(&self) -> i32 {
        self.order
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
