/// Favorite countries
///
/// A favorite is a persisted snapshot of a country's facts taken at save time,
/// plus the user's notes and an optional hosted picture.

pub mod id;
pub mod store;

pub use id::FavoriteId;
pub use store::FavoriteStore;

use crate::{countries::CountryRecord, media::MediaAsset};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A saved favorite country
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteCountry {
    pub id: FavoriteId,
    pub name: String,
    pub capital: Option<String>,
    pub population: u64,
    pub region: String,
    pub user_notes: Option<String>,
    /// URL and deletion handle travel together
    pub image: Option<MediaAsset>,
    pub date_saved: DateTime<Utc>,
}

/// Serialized flat: `image_url` and `image_public_id` rather than a nested object
impl Serialize for FavoriteCountry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FavoriteCountry", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("capital", &self.capital)?;
        state.serialize_field("population", &self.population)?;
        state.serialize_field("region", &self.region)?;
        state.serialize_field("user_notes", &self.user_notes)?;
        state.serialize_field("image_url", &self.image.as_ref().map(|i| i.url.as_str()))?;
        state.serialize_field(
            "image_public_id",
            &self.image.as_ref().map(|i| i.public_id.as_str()),
        )?;
        state.serialize_field("date_saved", &self.date_saved)?;
        state.end()
    }
}

/// Fields supplied when saving a favorite
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub country: CountryRecord,
    pub user_notes: Option<String>,
    pub image: Option<MediaAsset>,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct FavoriteUpdate {
    pub user_notes: Option<String>,
    pub image: Option<MediaAsset>,
}

impl FavoriteUpdate {
    pub fn is_empty(&self) -> bool {
        self.user_notes.is_none() && self.image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn favorite(image: Option<MediaAsset>) -> FavoriteCountry {
        FavoriteCountry {
            id: FavoriteId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap(),
            name: "France".to_string(),
            capital: Some("Paris".to_string()),
            population: 67_000_000,
            region: "Europe".to_string(),
            user_notes: None,
            image,
            date_saved: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_serializes_flat_image_fields() {
        let json = serde_json::to_value(favorite(Some(MediaAsset {
            url: "https://res.cloudinary.com/demo/image/upload/v1/paris.jpg".to_string(),
            public_id: "paris".to_string(),
        })))
        .unwrap();

        assert_eq!(json["id"], "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(
            json["image_url"],
            "https://res.cloudinary.com/demo/image/upload/v1/paris.jpg"
        );
        assert_eq!(json["image_public_id"], "paris");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_absent_image_serializes_both_null() {
        let json = serde_json::to_value(favorite(None)).unwrap();
        assert!(json["image_url"].is_null());
        assert!(json["image_public_id"].is_null());
        assert!(json["user_notes"].is_null());
        assert_eq!(json["date_saved"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(FavoriteUpdate::default().is_empty());
        assert!(!FavoriteUpdate {
            user_notes: Some(String::new()),
            image: None,
        }
        .is_empty());
    }
}
