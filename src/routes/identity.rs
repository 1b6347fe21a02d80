use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{dto::validation::validate_player_field, error::AppError, state::room::Member};

/// Header carrying the caller's player identity.
pub const PLAYER_ID_HEADER: &str = "x-player-id";
/// Optional header carrying the caller's display name.
pub const PLAYER_NAME_HEADER: &str = "x-player-name";

/// Player on whose behalf a REST call acts, read from the identity headers.
///
/// The display name defaults to the identity when the name header is absent.
#[derive(Debug, Clone)]
pub struct PlayerIdentity(pub Member);

impl PlayerIdentity {
    /// Identity of the caller.
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

impl<S> FromRequestParts<S> for PlayerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, PLAYER_ID_HEADER)?
            .ok_or_else(|| AppError::Unauthorized("missing X-Player-Id header".into()))?;
        let name = header_value(parts, PLAYER_NAME_HEADER)?.unwrap_or_else(|| id.clone());
        Ok(Self(Member { id, name }))
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<Option<String>, AppError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("header `{name}` is not valid text")))?
        .trim()
        .to_owned();
    validate_player_field(&value)
        .map_err(|err| AppError::BadRequest(format!("header `{name}`: {err}")))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Result<PlayerIdentity, AppError> {
        let (mut parts, _) = request.into_parts();
        PlayerIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn name_defaults_to_the_identity() {
        let request = Request::builder()
            .header(PLAYER_ID_HEADER, " p1 ")
            .body(())
            .unwrap();
        let PlayerIdentity(member) = extract(request).await.unwrap();
        assert_eq!(member.id, "p1");
        assert_eq!(member.name, "p1");
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let request = Request::builder()
            .header(PLAYER_NAME_HEADER, "Ann")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
