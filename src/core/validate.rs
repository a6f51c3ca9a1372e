// Draft validation run before any write reaches the network.
// Lengths count Unicode scalar values, not bytes.
use crate::core::error::{Error, FieldIssue};
use crate::core::record::{PostDraft, TodoDraft};

pub const POST_TITLE_MIN: usize = 5;
pub const POST_TITLE_MAX: usize = 100;
pub const POST_BODY_MIN: usize = 10;
pub const TODO_TITLE_MIN: usize = 3;
pub const TODO_TITLE_MAX: usize = 100;

pub trait Validate {
    /// Every violated constraint, at most one issue per field.
    fn issues(&self) -> Vec<FieldIssue>;

    fn validate(&self) -> Result<(), Error> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(issues))
        }
    }
}

impl Validate for PostDraft {
    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if let Some(issue) = check_title(&self.title, POST_TITLE_MIN, POST_TITLE_MAX) {
            issues.push(issue);
        }
        if self.body.chars().count() < POST_BODY_MIN {
            issues.push(FieldIssue::new(
                "body",
                format!("Content must be at least {POST_BODY_MIN} characters"),
            ));
        }
        if let Some(issue) = check_user_id(self.user_id) {
            issues.push(issue);
        }
        issues
    }
}

impl Validate for TodoDraft {
    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if let Some(issue) = check_title(&self.title, TODO_TITLE_MIN, TODO_TITLE_MAX) {
            issues.push(issue);
        }
        if let Some(issue) = check_user_id(self.user_id) {
            issues.push(issue);
        }
        issues
    }
}

fn check_title(title: &str, min: usize, max: usize) -> Option<FieldIssue> {
    let len = title.chars().count();
    if len < min {
        return Some(FieldIssue::new(
            "title",
            format!("Title must be at least {min} characters"),
        ));
    }
    if len > max {
        return Some(FieldIssue::new(
            "title",
            format!("Title must be at most {max} characters"),
        ));
    }
    None
}

fn check_user_id(user_id: i64) -> Option<FieldIssue> {
    if user_id <= 0 {
        return Some(FieldIssue::new("userId", "User ID must be a positive integer"));
    }
    None
}
