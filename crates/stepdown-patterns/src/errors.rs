//! Error types raised while scanning step text.

use thiserror::Error;

/// Errors surfaced while extracting parameters from step text.
///
/// Positions are zero-based byte offsets into the trimmed step text.
///
/// # Examples
/// ```
/// use stepdown_patterns::{StepTextError, process_step_text};
/// let err = process_step_text("use {braces}").err();
/// assert_eq!(
///     err,
///     Some(StepTextError::ReservedCharacter { character: '{', position: 4 })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepTextError {
    /// A placeholder brace appeared unescaped in plain step text.
    #[error("'{character}' is a reserved character and should be escaped")]
    ReservedCharacter {
        /// The offending brace.
        character: char,
        /// Byte offset of the brace.
        position: usize,
    },
    /// A `"` opened a static parameter that never closed.
    #[error("String not terminated")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        start: usize,
    },
    /// A `<` opened a dynamic or special parameter that never closed.
    #[error("Dynamic parameter not terminated")]
    UnterminatedParameter {
        /// Byte offset of the opening angle bracket.
        start: usize,
    },
}

impl StepTextError {
    /// Byte offset in the step text where the problem was detected.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::ReservedCharacter { position, .. } => *position,
            Self::UnterminatedString { start } | Self::UnterminatedParameter { start } => *start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_reserved_character() {
        let err = StepTextError::ReservedCharacter {
            character: '}',
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "'}' is a reserved character and should be escaped"
        );
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn formats_unterminated_constructs() {
        assert_eq!(
            StepTextError::UnterminatedString { start: 0 }.to_string(),
            "String not terminated"
        );
        assert_eq!(
            StepTextError::UnterminatedParameter { start: 7 }.position(),
            7
        );
    }
}
