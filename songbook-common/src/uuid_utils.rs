//! UUID utilities

use uuid::Uuid;

use crate::{Error, Result};

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a client-supplied identifier; `what` names it in the error message
pub fn parse_id(s: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(s.trim()).map_err(|_| Error::InvalidInput(format!("Invalid {} ID format", what)))
}

/// Parse an identifier read back from storage
pub fn parse_stored(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid stored id '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_valid() {
        let id = generate();
        assert_eq!(parse_id(&id.to_string(), "song").unwrap(), id);
    }

    #[test]
    fn test_parse_id_invalid_names_the_entity() {
        let err = parse_id("not-a-uuid", "group").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Invalid group ID format");
    }
}
