//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted room name.
pub const ROOM_NAME_MAX: usize = 50;
/// Longest accepted story sentence.
pub const SENTENCE_MAX: usize = 500;
/// Longest accepted scribe tag.
pub const SCRIBE_TAG_MAX: usize = 50;
/// Longest accepted player identity or display name.
pub const PLAYER_FIELD_MAX: usize = 64;

fn trimmed_length(
    value: &str,
    min: usize,
    max: usize,
    code: &'static str,
    label: &str,
) -> Result<(), ValidationError> {
    let length = value.trim().chars().count();
    if length < min || length > max {
        let mut err = ValidationError::new(code);
        err.message = Some(
            format!("{label} must be between {min} and {max} characters (got {length})").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Room names are 1 to 50 characters once trimmed.
///
/// ```ignore
/// validate_room_name("Midnight Crew") // Ok
/// validate_room_name("   ")           // Err - blank
/// ```
pub fn validate_room_name(name: &str) -> Result<(), ValidationError> {
    trimmed_length(name, 1, ROOM_NAME_MAX, "room_name_length", "Room name")
}

/// Sentences must not be blank.
pub fn validate_sentence(sentence: &str) -> Result<(), ValidationError> {
    trimmed_length(sentence, 1, SENTENCE_MAX, "sentence_length", "Sentence")
}

/// Optional label the scribe attaches to the chosen line.
pub fn validate_scribe_tag(tag: &str) -> Result<(), ValidationError> {
    trimmed_length(tag, 0, SCRIBE_TAG_MAX, "scribe_tag_length", "Scribe tag")
}

/// Player identities and display names.
pub fn validate_player_field(value: &str) -> Result<(), ValidationError> {
    trimmed_length(value, 1, PLAYER_FIELD_MAX, "player_field_length", "Player field")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_name_is_trimmed_before_measuring() {
        assert!(validate_room_name("  Crew  ").is_ok());
        assert!(validate_room_name("   ").is_err());
        assert!(validate_room_name(&"x".repeat(ROOM_NAME_MAX)).is_ok());
        assert!(validate_room_name(&"x".repeat(ROOM_NAME_MAX + 1)).is_err());
    }

    #[test]
    fn sentence_rejects_blank_and_oversized() {
        assert!(validate_sentence("The door creaked open.").is_ok());
        assert!(validate_sentence("\n\t").is_err());
        assert!(validate_sentence(&"a".repeat(SENTENCE_MAX + 1)).is_err());
    }

    #[test]
    fn scribe_tag_may_be_empty() {
        assert!(validate_scribe_tag("").is_ok());
        assert!(validate_scribe_tag(&"t".repeat(SCRIBE_TAG_MAX + 1)).is_err());
    }
}
