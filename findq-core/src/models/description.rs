//! QR code description validation
//!
//! The owner labels each code ("Front Door", "Bike Rack"). A label is
//! required; surrounding whitespace is dropped.

use super::ValidationError;

/// Maximum length for a code description
const MAX_DESCRIPTION_LEN: usize = 500;

/// Validated, trimmed, non-empty code description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Description(String);

impl Description {
    /// Create a description.
    ///
    /// # Example
    /// ```
    /// use findq_core::models::Description;
    ///
    /// assert_eq!(Description::new("  Front Door ").unwrap().as_str(), "Front Door");
    /// assert!(Description::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            });
        }

        if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        let err = Description::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn rejects_whitespace_only() {
        let err = Description::new(" \t\n").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length_counts_chars() {
        let ok = "é".repeat(500);
        assert!(Description::new(&ok).is_ok());

        let too_long = "é".repeat(501);
        let err = Description::new(&too_long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 500, .. }));
    }
}
