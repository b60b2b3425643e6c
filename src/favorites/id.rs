/// Favorite identifiers and their external string form
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned identifier of a favorite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteId(Uuid);

impl FavoriteId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// String form handed to API consumers
    pub fn to_external(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Whether a string is an acceptable external id
    ///
    /// Only the canonical lowercase hyphenated form is accepted, so every
    /// favorite has exactly one external spelling.
    pub fn is_valid_external_id(value: &str) -> bool {
        value.len() == 36
            && Uuid::try_parse(value)
                .map(|uuid| Self(uuid).to_external() == value)
                .unwrap_or(false)
    }

    /// Parse an external id
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        if !Self::is_valid_external_id(value) {
            return Err(ApiError::InvalidIdentifier(
                "Invalid favorite ID received!".to_string(),
            ));
        }

        Uuid::try_parse(value)
            .map(Self)
            .map_err(|_| ApiError::InvalidIdentifier("Invalid favorite ID received!".to_string()))
    }
}

impl fmt::Display for FavoriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_external())
    }
}

impl FromStr for FavoriteId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_round_trip() {
        let id = FavoriteId::generate();
        let external = id.to_external();
        assert!(FavoriteId::is_valid_external_id(&external));
        assert_eq!(FavoriteId::parse(&external).unwrap(), id);
        assert_eq!(external.parse::<FavoriteId>().unwrap(), id);
        assert_eq!(id.to_string(), external);
    }

    #[test]
    fn test_external_form_is_lowercase_hyphenated() {
        let id = FavoriteId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(id.to_external(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "123",
            "not-a-uuid",
            "64b7f0e2c3a1b2d3e4f5a6b7",
            "67e5504410b1426f9247bb680e5fe0c8",
            "{67e55044-10b1-426f-9247-bb680e5fe0c8}",
            "67e55044-10b1-426f-9247-bb680e5fe0cz",
            "67E55044-10B1-426F-9247-BB680E5FE0C8",
            "67e55044-10b1-426f-9247-BB680E5FE0C8",
        ] {
            assert!(!FavoriteId::is_valid_external_id(bad), "accepted {:?}", bad);
            assert!(matches!(
                FavoriteId::parse(bad),
                Err(ApiError::InvalidIdentifier(_))
            ));
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = FavoriteId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::json!("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
    }
}
