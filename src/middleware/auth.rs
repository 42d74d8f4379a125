use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::redirect::Found;
use crate::session;
use crate::state::AppState;

/// Authenticated identity resolved from the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

/// Resolves the session's user id into a `CurrentUser` request extension.
/// Sessions pointing at a user that no longer exists are logged out.
pub async fn load_current_user(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Some(user_id) = session::user_id(&session).await? {
        match state.store.find_user(user_id).await? {
            Some(user) => {
                request.extensions_mut().insert(CurrentUser {
                    id: user.id,
                    username: user.username,
                });
            }
            None => {
                tracing::warn!("Session refers to unknown user {}, logging out", user_id);
                session::log_out(&session).await?;
            }
        }
    }

    Ok(next.run(request).await)
}

/// Short-circuits anonymous requests to the login page, remembering where
/// they were headed when it was a page view.
pub async fn require_login(session: Session, request: Request, next: Next) -> AppResult<Response> {
    if request.extensions().get::<CurrentUser>().is_some() {
        return Ok(next.run(request).await);
    }

    if request.method() == Method::GET {
        session::save_redirect_url(&session, &request.uri().to_string()).await?;
    }

    tracing::debug!("Login required for {} {}", request.method(), request.uri());
    session::flash_error(&session, "You must be logged in to do that").await?;
    Ok(Found::to("/login").into_response())
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            tracing::debug!("No authenticated user on this request");
            AppError::internal_server_error("Login required before user lookup")
        })
    }
}
