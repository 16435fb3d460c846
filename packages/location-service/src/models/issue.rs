use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::NormalizedCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Pothole,
    StreetLight,
    Graffiti,
    Sanitation,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub location: NormalizedCoordinate, // Where the issue was reported
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by a reporter; id, status and timestamp are assigned on insert
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub category: IssueCategory,
    pub location: NormalizedCoordinate,
}

impl NewIssue {
    /// Validate issue data
    pub fn validate(&self) -> Result<(), IssueValidationError> {
        let title = self.title.trim();
        if title.is_empty() || title.chars().count() > 120 {
            return Err(IssueValidationError::InvalidTitle);
        }

        if let Some(ref desc) = self.description {
            if desc.chars().count() > 2000 {
                return Err(IssueValidationError::DescriptionTooLong);
            }
        }

        Ok(())
    }
}

impl Issue {
    /// Create a new open issue from a validated report
    pub fn new(report: NewIssue) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: report.title.trim().to_string(),
            description: report.description,
            category: report.category,
            status: IssueStatus::Open,
            location: report.location,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IssueValidationError {
    #[error("Issue title must be between 1 and 120 characters")]
    InvalidTitle,

    #[error("Description cannot exceed 2000 characters")]
    DescriptionTooLong,
}
