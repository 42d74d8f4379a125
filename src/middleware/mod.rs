pub mod auth;
pub mod method_override;
pub mod ownership;

pub use auth::{load_current_user, require_login, CurrentUser};
pub use method_override::method_override;
pub use ownership::{require_owner, require_review_author, OwnedListing};
