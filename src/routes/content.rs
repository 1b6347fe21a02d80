use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::content::{CreatePromptRequest, OriginResponse, PromptResponse},
    error::AppError,
    services::content_service,
    state::{SharedState, room::Theme, variant::StoryPhase},
};

/// Theme content endpoints: story origins and round prompts.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/themes/{theme}/origins", get(list_origins))
        .route("/themes/{theme}/origins/random", get(random_origin))
        .route("/themes/{theme}/prompts", post(add_prompt))
        .route("/themes/{theme}/prompts/{category}", get(list_prompts))
        .route(
            "/themes/{theme}/prompts/{category}/random",
            get(random_prompt),
        )
}

fn parse_theme(value: &str) -> Result<Theme, AppError> {
    Theme::parse(value).ok_or_else(|| AppError::NotFound(format!("unknown theme `{value}`")))
}

fn parse_category(value: &str) -> Result<StoryPhase, AppError> {
    StoryPhase::parse(value)
        .ok_or_else(|| AppError::BadRequest(format!("unknown prompt category `{value}`")))
}

#[utoipa::path(
    get,
    path = "/themes/{theme}/origins",
    tag = "content",
    params(("theme" = String, Path, description = "Theme label or slug, e.g. `weird-west`")),
    responses((status = 200, description = "Origins for the theme", body = [OriginResponse]))
)]
pub async fn list_origins(
    State(state): State<SharedState>,
    Path(theme): Path<String>,
) -> Result<Json<Vec<OriginResponse>>, AppError> {
    let theme = parse_theme(&theme)?;
    Ok(Json(content_service::list_origins(&state, theme).await))
}

#[utoipa::path(
    get,
    path = "/themes/{theme}/origins/random",
    tag = "content",
    params(("theme" = String, Path, description = "Theme label or slug")),
    responses((status = 200, description = "Random origin", body = OriginResponse))
)]
pub async fn random_origin(
    State(state): State<SharedState>,
    Path(theme): Path<String>,
) -> Result<Json<OriginResponse>, AppError> {
    let theme = parse_theme(&theme)?;
    Ok(Json(content_service::random_origin(&state, theme).await?))
}

#[utoipa::path(
    get,
    path = "/themes/{theme}/prompts/{category}",
    tag = "content",
    params(("theme" = String, Path, description = "Theme label or slug"),
    ("category" = String, Path, description = "SETTING, ACTION or CONSEQUENCE")),
    responses((status = 200, description = "Prompts for the theme and phase", body = [PromptResponse]))
)]
pub async fn list_prompts(
    State(state): State<SharedState>,
    Path((theme, category)): Path<(String, String)>,
) -> Result<Json<Vec<PromptResponse>>, AppError> {
    let theme = parse_theme(&theme)?;
    let category = parse_category(&category)?;
    Ok(Json(
        content_service::list_prompts(&state, theme, category).await,
    ))
}

#[utoipa::path(
    get,
    path = "/themes/{theme}/prompts/{category}/random",
    tag = "content",
    params(("theme" = String, Path, description = "Theme label or slug"),
    ("category" = String, Path, description = "SETTING, ACTION or CONSEQUENCE")),
    responses((status = 200, description = "Random prompt", body = PromptResponse))
)]
pub async fn random_prompt(
    State(state): State<SharedState>,
    Path((theme, category)): Path<(String, String)>,
) -> Result<Json<PromptResponse>, AppError> {
    let theme = parse_theme(&theme)?;
    let category = parse_category(&category)?;
    Ok(Json(
        content_service::random_prompt(&state, theme, category).await?,
    ))
}

/// Store a new prompt. Needs a storage backend.
#[utoipa::path(
    post,
    path = "/themes/{theme}/prompts",
    tag = "content",
    params(("theme" = String, Path, description = "Theme label or slug")),
    request_body = CreatePromptRequest,
    responses((status = 201, description = "Prompt stored", body = PromptResponse))
)]
pub async fn add_prompt(
    State(state): State<SharedState>,
    Path(theme): Path<String>,
    Valid(Json(payload)): Valid<Json<CreatePromptRequest>>,
) -> Result<(StatusCode, Json<PromptResponse>), AppError> {
    let theme = parse_theme(&theme)?;
    let prompt = content_service::add_prompt(&state, theme, payload).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_accept_slugs_and_any_case() {
        assert_eq!(parse_theme("weird-west").unwrap(), Theme::WeirdWest);
        assert_eq!(parse_theme("Cosmic Horror").unwrap(), Theme::CosmicHorror);
        assert!(matches!(parse_theme("space-opera"), Err(AppError::NotFound(_))));
        assert_eq!(parse_category("action").unwrap(), StoryPhase::Action);
        assert!(matches!(parse_category("epilogue"), Err(AppError::BadRequest(_))));
    }
}
