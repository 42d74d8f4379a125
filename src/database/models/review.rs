use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub author: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author == user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i16,
    pub comment: String,
    pub author: Uuid,
}

/// Review resolved for display together with its author's username
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub author_name: Option<String>,
}
