use thiserror::Error;

/// Error when parsing an invalid status or role string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{invalid}'. Valid values: {expected}")]
pub struct ParseStatusError {
    invalid: String,
    expected: String,
}

impl ParseStatusError {
    pub fn new<'a>(invalid: &str, expected: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            invalid: invalid.to_string(),
            expected: expected.into_iter().collect::<Vec<_>>().join(", "),
        }
    }
}
