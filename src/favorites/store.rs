/// Favorites Store - Database layer for saved favorite countries
use crate::{
    error::{ApiError, ApiResult},
    favorites::{FavoriteCountry, FavoriteId, FavoriteUpdate, NewFavorite},
    media::MediaAsset,
};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, capital, population, region, user_notes,
           image_url, image_public_id, date_saved
    FROM favourites
"#;

/// Favorites collection over SQLite
#[derive(Clone)]
pub struct FavoriteStore {
    db: SqlitePool,
}

impl FavoriteStore {
    /// Create a new store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Check whether a favorite with this exact name exists
    pub async fn exists_by_name(&self, name: &str) -> ApiResult<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM favourites WHERE name = ?1)")
                .bind(name)
                .fetch_one(&self.db)
                .await?;

        Ok(exists != 0)
    }

    /// Insert a favorite, assigning its id and save timestamp
    ///
    /// The unique index on `name` turns a lost check-then-insert race into a Conflict.
    pub async fn insert(&self, new: NewFavorite) -> ApiResult<FavoriteCountry> {
        let favorite = FavoriteCountry {
            id: FavoriteId::generate(),
            name: new.country.name,
            capital: new.country.capital,
            population: new.country.population,
            region: new.country.region,
            user_notes: new.user_notes,
            image: new.image,
            // Stored with microsecond precision; keep the returned value identical
            date_saved: Utc::now().trunc_subsecs(6),
        };

        let population = i64::try_from(favorite.population)
            .map_err(|_| ApiError::Validation("Population out of range".to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO favourites
                (id, name, capital, population, region, user_notes,
                 image_url, image_public_id, date_saved)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(favorite.id.to_external())
        .bind(&favorite.name)
        .bind(&favorite.capital)
        .bind(population)
        .bind(&favorite.region)
        .bind(&favorite.user_notes)
        .bind(favorite.image.as_ref().map(|i| i.url.as_str()))
        .bind(favorite.image.as_ref().map(|i| i.public_id.as_str()))
        .bind(format_timestamp(&favorite.date_saved))
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(favorite),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(ApiError::Conflict(
                format!("'{}' is already in your favorites.", favorite.name),
            )),
            Err(e) => Err(ApiError::Database(e)),
        }
    }

    /// Get a favorite by id
    pub async fn find_by_id(&self, id: &FavoriteId) -> ApiResult<Option<FavoriteCountry>> {
        let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_COLUMNS))
            .bind(id.to_external())
            .fetch_optional(&self.db)
            .await?;

        row.map(|row| favorite_from_row(&row)).transpose()
    }

    /// Get a favorite by exact name
    pub async fn find_by_name(&self, name: &str) -> ApiResult<Option<FavoriteCountry>> {
        let row = sqlx::query(&format!("{} WHERE name = ?1", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        row.map(|row| favorite_from_row(&row)).transpose()
    }

    /// List favorites, newest first
    pub async fn list_sorted(&self, limit: u32, skip: u32) -> ApiResult<Vec<FavoriteCountry>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY date_saved DESC, rowid DESC LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS
        ))
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(favorite_from_row).collect()
    }

    /// Apply a partial update
    ///
    /// Only supplied fields are written; `date_saved` is never touched.
    pub async fn update_fields(&self, id: &FavoriteId, update: FavoriteUpdate) -> ApiResult<()> {
        if update.is_empty() {
            return Err(ApiError::Validation("No update fields provided.".to_string()));
        }

        let image_url = update.image.as_ref().map(|i| i.url.as_str());
        let image_public_id = update.image.as_ref().map(|i| i.public_id.as_str());

        let result = sqlx::query(
            r#"
            UPDATE favourites SET
                user_notes = COALESCE(?2, user_notes),
                image_url = COALESCE(?3, image_url),
                image_public_id = COALESCE(?4, image_public_id)
            WHERE id = ?1
            "#,
        )
        .bind(id.to_external())
        .bind(&update.user_notes)
        .bind(image_url)
        .bind(image_public_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "No favorite country found to update!".to_string(),
            ));
        }

        Ok(())
    }

    /// Delete a favorite by id
    pub async fn delete_by_id(&self, id: &FavoriteId) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM favourites WHERE id = ?1")
            .bind(id.to_external())
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(
                "No favorite country found to delete!".to_string(),
            ));
        }

        Ok(())
    }
}

fn favorite_from_row(row: &SqliteRow) -> ApiResult<FavoriteCountry> {
    let id: String = row.try_get("id")?;
    let population: i64 = row.try_get("population")?;
    let image_url: Option<String> = row.try_get("image_url")?;
    let image_public_id: Option<String> = row.try_get("image_public_id")?;

    let image = match (image_url, image_public_id) {
        (Some(url), Some(public_id)) => Some(MediaAsset { url, public_id }),
        _ => None,
    };

    Ok(FavoriteCountry {
        id: FavoriteId::parse(&id)
            .map_err(|_| ApiError::Internal(format!("Corrupt favorite id in database: {}", id)))?,
        name: row.try_get("name")?,
        capital: row.try_get("capital")?,
        population: u64::try_from(population)
            .map_err(|_| ApiError::Internal(format!("Negative population for {}", id)))?,
        region: row.try_get("region")?,
        user_notes: row.try_get("user_notes")?,
        image,
        date_saved: parse_timestamp(&row.try_get::<String, _>("date_saved")?)?,
    })
}

/// Fixed-width RFC 3339 so that text order matches time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Internal(format!("Invalid timestamp: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{countries::CountryRecord, db};

    async fn store() -> FavoriteStore {
        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        FavoriteStore::new(pool)
    }

    fn new_favorite(name: &str, population: u64) -> NewFavorite {
        NewFavorite {
            country: CountryRecord {
                name: name.to_string(),
                capital: Some(format!("{} City", name)),
                population,
                region: "Europe".to_string(),
            },
            user_notes: None,
            image: None,
        }
    }

    fn asset(public_id: &str) -> MediaAsset {
        MediaAsset {
            url: format!("https://res.cloudinary.com/demo/image/upload/{}.jpg", public_id),
            public_id: public_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = store().await;
        let saved = store.insert(new_favorite("France", 67_000_000)).await.unwrap();

        let by_id = store.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(by_id, saved);

        let by_name = store.find_by_name("France").await.unwrap().unwrap();
        assert_eq!(by_name.id, saved.id);

        assert!(store.exists_by_name("France").await.unwrap());
        assert!(!store.exists_by_name("france").await.unwrap());
        assert!(store.find_by_name("Spain").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = store().await;
        store.insert(new_favorite("France", 1)).await.unwrap();

        let err = store.insert(new_favorite("France", 2)).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let all = store.list_sorted(10, 0).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].population, 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let store = store().await;
        for name in ["Austria", "Belgium", "Croatia", "Denmark"] {
            store.insert(new_favorite(name, 1)).await.unwrap();
        }

        let all = store.list_sorted(10, 0).await.unwrap();
        let names: Vec<_> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Denmark", "Croatia", "Belgium", "Austria"]);
        assert!(all.windows(2).all(|w| w[0].date_saved >= w[1].date_saved));

        let page = store.list_sorted(2, 1).await.unwrap();
        let names: Vec<_> = page.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Croatia", "Belgium"]);

        assert!(store.list_sorted(10, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_leaves_other_fields() {
        let store = store().await;
        let mut new = new_favorite("France", 67_000_000);
        new.image = Some(asset("old"));
        let saved = store.insert(new).await.unwrap();

        store
            .update_fields(
                &saved.id,
                FavoriteUpdate {
                    user_notes: Some("Visit in spring".to_string()),
                    image: None,
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(updated.user_notes.as_deref(), Some("Visit in spring"));
        assert_eq!(updated.image, Some(asset("old")));
        assert_eq!(updated.date_saved, saved.date_saved);
        assert_eq!(updated.population, saved.population);

        store
            .update_fields(
                &saved.id,
                FavoriteUpdate {
                    user_notes: None,
                    image: Some(asset("new")),
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(updated.user_notes.as_deref(), Some("Visit in spring"));
        assert_eq!(updated.image, Some(asset("new")));
        assert_eq!(updated.date_saved, saved.date_saved);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let store = store().await;
        let saved = store.insert(new_favorite("France", 1)).await.unwrap();

        let err = store
            .update_fields(&saved.id, FavoriteUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = store().await;
        let missing = FavoriteId::generate();

        let err = store
            .update_fields(
                &missing,
                FavoriteUpdate {
                    user_notes: Some("x".to_string()),
                    image: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = store.delete_by_id(&missing).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = store().await;
        let saved = store.insert(new_favorite("France", 1)).await.unwrap();

        store.delete_by_id(&saved.id).await.unwrap();
        assert!(store.find_by_id(&saved.id).await.unwrap().is_none());
        assert!(!store.exists_by_name("France").await.unwrap());
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let early = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2024-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);

        let a = format_timestamp(&early);
        let b = format_timestamp(&later);
        assert_eq!(a, "2024-01-01T00:00:00.000000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(parse_timestamp(&b).unwrap(), later);
    }
}
