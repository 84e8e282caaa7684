//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `SessionId`: UUID-based unique session identifier
//! - `ParticipantName`: validated 1-50 character alphanumeric display name

use uuid::Uuid;

use crate::error::ChatError;

/// Maximum length of a participant name in characters
pub const MAX_NAME_LENGTH: usize = 50;

/// Unique session identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe session identification.
/// Implements Hash and Eq for use as map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Participant display name
///
/// Immutable once constructed. Comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantName(String);

impl ParticipantName {
    /// Validate raw name bytes (terminator already stripped)
    pub fn parse(raw: &[u8]) -> Result<Self, ChatError> {
        if raw.is_empty() {
            return Err(ChatError::NameEmpty);
        }
        if let Some(pos) = raw.iter().position(|b| !b.is_ascii_alphanumeric()) {
            if pos >= MAX_NAME_LENGTH {
                return Err(ChatError::NameTooLong);
            }
            return Err(ChatError::NameNotAlphanumeric);
        }
        if raw.len() > MAX_NAME_LENGTH {
            return Err(ChatError::NameTooLong);
        }
        // All bytes are ASCII at this point
        let name = raw.iter().map(|&b| char::from(b)).collect();
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_name_max_length() {
        let raw = "a".repeat(MAX_NAME_LENGTH);
        let name = ParticipantName::parse(raw.as_bytes()).unwrap();
        assert_eq!(name.as_str().len(), 50);

        let raw = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            ParticipantName::parse(raw.as_bytes()),
            Err(ChatError::NameTooLong)
        ));
    }

    #[test]
    fn test_name_rejects_non_alphanumeric() {
        for raw in [&b"al ice"[..], b"bob!", b"caf\xc3\xa9", b"eve\r"] {
            assert!(matches!(
                ParticipantName::parse(raw),
                Err(ChatError::NameNotAlphanumeric)
            ));
        }
    }

    #[test]
    fn test_name_rejects_empty() {
        assert!(matches!(
            ParticipantName::parse(b""),
            Err(ChatError::NameEmpty)
        ));
    }

    #[test]
    fn test_name_case_sensitive() {
        let lower = ParticipantName::parse(b"alice").unwrap();
        let upper = ParticipantName::parse(b"Alice").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(upper.to_string(), "Alice");
    }
}
