use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("userID can't be empty")]
    EmptyUserId,
}

pub trait MessageValidator: Send + Sync {
    fn validate(&self, user_id: &str) -> Result<(), ValidationError>;
}

// Only rejects a missing/empty user id
#[derive(Debug, Clone, Copy, Default)]
pub struct UserIdValidator;

impl MessageValidator for UserIdValidator {
    fn validate(&self, user_id: &str) -> Result<(), ValidationError> {
        if user_id.is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        Ok(())
    }
}
