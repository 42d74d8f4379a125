//! Session keys and flash notices.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppResult;

pub const USER_ID: &str = "user_id";
pub const REDIRECT_URL: &str = "redirect_url";
pub const FLASH: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// One-shot notice shown on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

pub async fn flash(session: &Session, level: FlashLevel, message: impl Into<String>) -> AppResult<()> {
    let mut pending: Vec<FlashMessage> = session.get(FLASH).await?.unwrap_or_default();
    pending.push(FlashMessage {
        level,
        message: message.into(),
    });
    session.insert(FLASH, pending).await?;
    Ok(())
}

pub async fn flash_success(session: &Session, message: impl Into<String>) -> AppResult<()> {
    flash(session, FlashLevel::Success, message).await
}

pub async fn flash_error(session: &Session, message: impl Into<String>) -> AppResult<()> {
    flash(session, FlashLevel::Error, message).await
}

/// Drain pending notices
pub async fn take_flash(session: &Session) -> AppResult<Vec<FlashMessage>> {
    Ok(session.remove::<Vec<FlashMessage>>(FLASH).await?.unwrap_or_default())
}

pub async fn user_id(session: &Session) -> AppResult<Option<Uuid>> {
    Ok(session.get::<Uuid>(USER_ID).await?)
}

/// Bind the session to a user, rotating the session id
pub async fn log_in(session: &Session, user_id: Uuid) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user_id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> AppResult<()> {
    session.remove::<Uuid>(USER_ID).await?;
    Ok(())
}

pub async fn save_redirect_url(session: &Session, url: &str) -> AppResult<()> {
    session.insert(REDIRECT_URL, url).await?;
    Ok(())
}

pub async fn take_redirect_url(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(REDIRECT_URL).await?)
}
