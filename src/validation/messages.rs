use crate::error::{AppError, Result};

/// The maximum message length, matching the `VARCHAR(140)` column.
pub const MAX_MESSAGE_CHARS: usize = 140;

/// Validates message text. The text is stored verbatim; only the bounds are
/// checked.
pub fn validate_message_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Message text cannot be empty".to_string(),
        ));
    }

    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "Message text must be at most {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_bounds() {
        assert!(validate_message_text("Hello").is_ok());
        assert!(validate_message_text("").is_err());
        assert!(validate_message_text("   ").is_err());
        assert!(validate_message_text(&"a".repeat(140)).is_ok());
        assert!(validate_message_text(&"a".repeat(141)).is_err());
    }

    #[test]
    fn length_is_counted_in_chars() {
        // 140 multi-byte characters are within the limit.
        assert!(validate_message_text(&"é".repeat(140)).is_ok());
    }
}
