//! Write-payload validation rules.
//!
//! Lengths are measured in characters. A field that is present in a payload
//! must be non-empty; an empty string is rejected, not treated as missing.

use crate::issue::{IssueChanges, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, NewIssue};
use crate::project::{MAX_PROJECT_NAME_LEN, NewProject, ProjectChanges};
use crate::user::NewUser;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    TitleRequired,

    #[error("title must be 255 characters or less (got {0})")]
    TitleTooLong(usize),

    #[error("description is required")]
    DescriptionRequired,

    #[error("description must be 65536 characters or less (got {0})")]
    DescriptionTooLong(usize),

    #[error("project name is required")]
    ProjectNameRequired,

    #[error("project name must be 255 characters or less (got {0})")]
    ProjectNameTooLong(usize),

    #[error("project description must be 65536 characters or less (got {0})")]
    ProjectDescriptionTooLong(usize),

    #[error("name is required")]
    NameRequired,

    #[error("email is required")]
    EmailRequired,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Validates an issue creation payload.
pub fn validate_new_issue(issue: &NewIssue) -> Result<(), ValidationError> {
    check_title(&issue.title)?;
    check_description(&issue.description)
}

/// Validates an issue update payload. Absent fields are not checked.
pub fn validate_issue_changes(changes: &IssueChanges) -> Result<(), ValidationError> {
    if let Some(ref title) = changes.title {
        check_title(title)?;
    }
    if let Some(ref description) = changes.description {
        check_description(description)?;
    }
    Ok(())
}

/// Validates a project creation payload.
pub fn validate_new_project(project: &NewProject) -> Result<(), ValidationError> {
    check_project_name(&project.name)?;
    if let Some(ref description) = project.description {
        check_project_description(description)?;
    }
    Ok(())
}

/// Validates a project update payload.
pub fn validate_project_changes(changes: &ProjectChanges) -> Result<(), ValidationError> {
    if let Some(ref name) = changes.name {
        check_project_name(name)?;
    }
    if let Some(Some(ref description)) = changes.description {
        check_project_description(description)?;
    }
    Ok(())
}

/// Validates a user creation payload.
pub fn validate_new_user(user: &NewUser) -> Result<(), ValidationError> {
    if user.name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if user.email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    match user.email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(user.email.clone())),
    }
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong(len));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), ValidationError> {
    if description.is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

fn check_project_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::ProjectNameRequired);
    }
    let len = name.chars().count();
    if len > MAX_PROJECT_NAME_LEN {
        return Err(ValidationError::ProjectNameTooLong(len));
    }
    Ok(())
}

fn check_project_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::ProjectDescriptionTooLong(len));
    }
    Ok(())
}
