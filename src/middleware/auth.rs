use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use plateful_user::validate_jwt;
use serde_json::json;

use crate::routes::AppState;

/// Auth extension containing the user_id extracted from the JWT
#[derive(Clone, Debug)]
pub struct Auth {
    pub user_id: String,
}

/// Auth extension for endpoints that are public but personalize their
/// response when a valid token is present.
#[derive(Clone, Debug, Default)]
pub struct MaybeAuth(pub Option<Auth>);

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn resolve_auth(state: &AppState, req: &Request) -> Option<Auth> {
    let token = bearer_token(req)?;

    let claims = match validate_jwt(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Invalid JWT token: {:?}", e);
            return None;
        }
    };

    // Verify the account still exists; a token may outlive its user
    let user_exists = sqlx::query(r#"SELECT id FROM "user" WHERE id = ?1"#)
        .bind(&claims.sub)
        .fetch_optional(&state.pool)
        .await;

    match user_exists {
        Ok(Some(_)) => Some(Auth {
            user_id: claims.sub,
        }),
        Ok(None) => {
            tracing::warn!("User {} from token no longer exists", claims.sub);
            None
        }
        Err(e) => {
            tracing::error!("Database error checking user existence: {:?}", e);
            None
        }
    }
}

/// Authentication middleware that validates a `Bearer` token
///
/// Rejects the request with a 401 JSON body if the header is missing, the
/// token does not verify, or the user behind it is gone.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_auth(&state, &req).await {
        Some(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "errors": "Authentication credentials were not provided or are invalid"
            })),
        )
            .into_response(),
    }
}

/// Lenient variant of [`auth_middleware`] for viewer-aware public routes.
///
/// Never rejects; handlers that do require a user convert a `None` into a
/// 401 themselves.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let auth = resolve_auth(&state, &req).await;
    req.extensions_mut().insert(MaybeAuth(auth));
    next.run(req).await
}

