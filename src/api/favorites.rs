/// Favorite country endpoints (CRUD with image lifecycle)
use crate::{
    api::{form::FavoriteForm, DataResponse, MessageResponse},
    context::AppContext,
    error::{ApiError, ApiResult},
    favorites::{FavoriteCountry, FavoriteId, FavoriteUpdate, NewFavorite},
    media::MediaAsset,
};
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

/// Build favorite routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/favorites", get(list_favorites).post(create_favorite))
        .route(
            "/favorites/:favorite_id",
            get(get_favorite).put(update_favorite).delete(delete_favorite),
        )
}

/// Pagination for `GET /favorites`
#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub skip: u32,
}

fn default_limit() -> u32 {
    10
}

/// Name of the country to save, as validated
#[derive(Debug, Validate)]
struct CreateFields {
    #[validate(length(min = 1, max = 200, message = "Field 'name' is required"))]
    name: String,
}

/// Save a country as a favorite, optionally with a picture
async fn create_favorite(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<DataResponse<FavoriteCountry>>)> {
    let form = FavoriteForm::parse(multipart).await?;
    let fields = CreateFields {
        name: form.name.unwrap_or_default().trim().to_string(),
    };
    fields.validate()?;
    let name = fields.name;

    tracing::info!("create_favorite: saving '{}'", name);

    if ctx.favorites.exists_by_name(&name).await? {
        return Err(duplicate(&name));
    }

    let country = ctx
        .countries
        .lookup(&name)
        .await
        .into_result(&name)
        .map_err(|e| match e {
            ApiError::NotFound(_) => ApiError::NotFound(format!(
                "Cannot save favorite: Country '{}' not found.",
                name
            )),
            other => other,
        })?;

    // The upstream spelling is what gets stored, so check it too
    if country.name != name && ctx.favorites.exists_by_name(&country.name).await? {
        return Err(duplicate(&country.name));
    }

    let image = match form.image {
        Some(upload) => Some(ctx.media.upload(upload).await?),
        None => None,
    };

    let new = NewFavorite {
        country,
        user_notes: form.user_notes,
        image: image.clone(),
    };

    let favorite = match ctx.favorites.insert(new).await {
        Ok(favorite) => favorite,
        Err(e) => {
            if let Some(asset) = &image {
                discard_image(&ctx, asset, "insert failed").await;
            }
            return Err(e);
        }
    };

    tracing::info!(
        "create_favorite: saved '{}' as {}",
        favorite.name,
        favorite.id
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: favorite })))
}

/// List favorites, newest first
async fn list_favorites(
    State(ctx): State<AppContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<Vec<FavoriteCountry>>>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    query.validate()?;

    let favorites = ctx.favorites.list_sorted(query.limit, query.skip).await?;
    Ok(Json(DataResponse { data: favorites }))
}

/// Get a specific favorite
async fn get_favorite(
    State(ctx): State<AppContext>,
    Path(favorite_id): Path<String>,
) -> ApiResult<Json<DataResponse<FavoriteCountry>>> {
    let id = FavoriteId::parse(&favorite_id)?;

    let favorite = ctx
        .favorites
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Favorite country not found.".to_string()))?;

    Ok(Json(DataResponse { data: favorite }))
}

/// Update notes and/or picture of a favorite
///
/// A replacement picture is uploaded first and the record updated; only then
/// is the previous picture removed from the media host.
async fn update_favorite(
    State(ctx): State<AppContext>,
    Path(favorite_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = FavoriteId::parse(&favorite_id)?;

    let existing = ctx
        .favorites
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No favorite country found to update!".to_string()))?;

    let form = FavoriteForm::parse(multipart).await?;
    if form.user_notes.is_none() && form.image.is_none() {
        return Err(ApiError::Validation("No update fields provided.".to_string()));
    }

    let image = match form.image {
        Some(upload) => Some(ctx.media.upload(upload).await?),
        None => None,
    };

    let update = FavoriteUpdate {
        user_notes: form.user_notes,
        image: image.clone(),
    };

    if let Err(e) = ctx.favorites.update_fields(&id, update).await {
        if let Some(asset) = &image {
            discard_image(&ctx, asset, "update failed").await;
        }
        return Err(e);
    }

    if let (Some(_), Some(previous)) = (&image, &existing.image) {
        discard_image(&ctx, previous, "replaced").await;
    }

    tracing::info!("update_favorite: updated {}", id);

    Ok(Json(MessageResponse::new(
        "Favorite country updated successfully!",
    )))
}

/// Delete a favorite and its hosted picture
async fn delete_favorite(
    State(ctx): State<AppContext>,
    Path(favorite_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = FavoriteId::parse(&favorite_id)?;

    let favorite = ctx
        .favorites
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No favorite country found to delete!".to_string()))?;

    if let Some(asset) = &favorite.image {
        discard_image(&ctx, asset, "favorite deleted").await;
    }

    ctx.favorites.delete_by_id(&id).await?;

    tracing::info!("delete_favorite: deleted '{}' ({})", favorite.name, id);

    Ok(Json(MessageResponse::new(
        "Favorite country deleted successfully!",
    )))
}

fn duplicate(name: &str) -> ApiError {
    ApiError::Conflict(format!("'{}' is already in your favorites.", name))
}

/// Best-effort removal of a hosted picture
///
/// Failure leaves an orphaned asset on the media host; it is logged and the
/// request carries on.
async fn discard_image(ctx: &AppContext, asset: &MediaAsset, reason: &str) {
    if let Err(e) = ctx.media.destroy(&asset.public_id).await {
        tracing::warn!(
            public_id = %asset.public_id,
            reason,
            error = %e,
            "Failed to delete image from media host; asset left orphaned"
        );
    }
}
