//! Server-rendered HTML pages.

pub mod error;
pub mod listings;
pub mod users;

use axum::response::Html;
use tower_sessions::Session;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::session::{self, FlashMessage};

/// Escape text placed in HTML element content
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape text placed inside a double-quoted attribute value
pub fn attr(text: &str) -> String {
    html_escape::encode_double_quoted_attribute(text).into_owned()
}

/// Render a page inside the shared layout, consuming pending flash notices
pub async fn render(
    session: &Session,
    user: Option<&CurrentUser>,
    title: &str,
    body: &str,
) -> AppResult<Html<String>> {
    let flashes = session::take_flash(session).await?;
    Ok(Html(layout(title, user, &flashes, body)))
}

pub fn layout(title: &str, user: Option<&CurrentUser>, flashes: &[FlashMessage], body: &str) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<span class="navbar-user">{}</span> <a href="/logout">Log out</a>"#,
            escape(&user.username)
        ),
        None => r#"<a href="/signup">Sign up</a> <a href="/login">Log in</a>"#.to_string(),
    };

    let notices: String = flashes
        .iter()
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}" role="alert">{}</div>"#,
                flash.level.as_str(),
                escape(&flash.message)
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | Wanderlust</title>
</head>
<body>
    <nav class="navbar">
        <a href="/listings">Wanderlust</a>
        <a href="/listings">All listings</a>
        <a href="/listings/new">Add a listing</a>
        {account}
    </nav>
    {notices}
    <main class="container">
{body}
    </main>
    <footer>&copy; Wanderlust</footer>
</body>
</html>
"#,
        title = escape(title),
        account = account,
        notices = notices,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashLevel;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
    }

    #[test]
    fn attribute_values_cannot_break_out_of_quotes() {
        let escaped = attr(r#"x" onload="alert(1)"#);
        assert!(!escaped.contains('"'));
        assert!(escaped.contains("&quot;"));
    }

    #[test]
    fn layout_shows_flash_and_account_links() {
        let flashes = vec![FlashMessage {
            level: FlashLevel::Success,
            message: "New Listing Created!".to_string(),
        }];
        let anonymous = layout("All listings", None, &flashes, "<p>body</p>");
        assert!(anonymous.contains("flash-success"));
        assert!(anonymous.contains("New Listing Created!"));
        assert!(anonymous.contains("/login"));

        let user = CurrentUser {
            id: uuid::Uuid::new_v4(),
            username: "<sam>".to_string(),
        };
        let signed_in = layout("All listings", Some(&user), &[], "");
        assert!(signed_in.contains("&lt;sam&gt;"));
        assert!(signed_in.contains("/logout"));
    }
}
