use axum::{
    extract::State,
    response::Html,
};
use tower_sessions::Session;

use crate::database::{NewUser, StoreError};
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::redirect::Found;
use crate::session;
use crate::state::AppState;
use crate::validation::{LoginForm, SignupForm, ValidatedForm};
use crate::views;

/// GET /signup
pub async fn signup_form(session: Session, user: Option<CurrentUser>) -> AppResult<Html<String>> {
    views::render(&session, user.as_ref(), "Sign up", &views::users::signup_form()).await
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    ValidatedForm(form): ValidatedForm<SignupForm>,
) -> AppResult<Found> {
    let new_user = NewUser::new(form.username.trim(), form.email.trim(), &form.password)?;

    let user = match state.store.insert_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(message)) => {
            session::flash_error(&session, message).await?;
            return Ok(Found::to("/signup"));
        }
        Err(other) => return Err(other.into()),
    };

    tracing::info!("Registered user '{}' ({})", user.username, user.id);
    session::log_in(&session, user.id).await?;
    session::flash_success(&session, "Welcome to Wanderlust!").await?;
    Ok(Found::to("/listings"))
}

/// GET /login
pub async fn login_form(session: Session, user: Option<CurrentUser>) -> AppResult<Html<String>> {
    views::render(&session, user.as_ref(), "Log in", &views::users::login_form()).await
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<Found> {
    let user = state
        .store
        .find_user_by_username(form.username.trim())
        .await?
        .filter(|user| user.verify_password(&form.password));

    let Some(user) = user else {
        tracing::warn!("Failed login for '{}'", form.username);
        session::flash_error(&session, "Invalid username or password").await?;
        return Ok(Found::to("/login"));
    };

    let redirect_url = session::take_redirect_url(&session)
        .await?
        .unwrap_or_else(|| "/listings".to_string());

    session::log_in(&session, user.id).await?;
    session::flash_success(&session, "Welcome back to Wanderlust!").await?;
    Ok(Found::to(redirect_url))
}

/// GET /logout
pub async fn logout(session: Session) -> AppResult<Found> {
    session::log_out(&session).await?;
    session::flash_success(&session, "You are logged out!").await?;
    Ok(Found::to("/listings"))
}
