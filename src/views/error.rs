use axum::{http::StatusCode, response::Html};

use super::{escape, layout};

pub fn page(status: StatusCode, message: &str) -> Html<String> {
    let body = format!(
        r#"        <div class="error">
            <h2>{code} {reason}</h2>
            <p class="error-message">{message}</p>
            <a href="/listings">Back to listings</a>
        </div>"#,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        message = escape(message),
    );

    Html(layout("Error", None, &[], &body))
}
