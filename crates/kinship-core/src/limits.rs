//! Input validation limits for node fields

/// Maximum length for a user name (256 chars)
pub const MAX_NAME_LEN: usize = 256;

/// Maximum length for an email address (320 chars)
pub const MAX_EMAIL_LEN: usize = 320;

/// Maximum length for a post title (512 chars)
pub const MAX_TITLE_LEN: usize = 512;

/// Maximum length for post or comment content (64KB)
pub const MAX_CONTENT_LEN: usize = 64 * 1024;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Blank { field: &'static str },
    TooLong { field: &'static str, len: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, len, max } => {
                write!(f, "{} too long: {} chars (max {})", field, len, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}

/// Validate user name
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    validate_text("name", name, MAX_NAME_LEN)
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    validate_text("email", email, MAX_EMAIL_LEN)
}

/// Validate post title
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    validate_text("title", title, MAX_TITLE_LEN)
}

/// Validate post or comment content
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    validate_text("content", content, MAX_CONTENT_LEN)
}
