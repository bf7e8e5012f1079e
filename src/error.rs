use thiserror::Error;

/// Input rejected before it reaches the store; the caller blocks progression
/// and surfaces the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("at least one seat must be selected")]
    NoSeats,

    #[error("selected {selected} seats, limit is {limit}")]
    TooManySeats { selected: usize, limit: usize },

    #[error("total amount {actual} does not match expected {expected}")]
    AmountMismatch { expected: u32, actual: u32 },
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
