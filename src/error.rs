use thiserror::Error;

/// Domain failures raised by the services. They travel inside `anyhow::Error`,
/// so callers match on them with `downcast_ref::<ModelError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("user '{0}' is not staff and cannot author posts")]
    AuthorNotStaff(String),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("post {0} not found")]
    PostNotFound(i64),

    #[error("no comment count returned for post {0}")]
    MissingCommentCount(i64),
}
