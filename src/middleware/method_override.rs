use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};

pub const METHOD_PARAM: &str = "_method";

/// HTML forms only submit GET and POST. A POST carrying `?_method=PUT`
/// (or PATCH/DELETE) is rewritten to that method before routing.
pub async fn method_override(mut request: Request, next: Next) -> Response {
    if request.method() == Method::POST {
        if let Some(method) = override_from_query(request.uri().query()) {
            tracing::trace!("Method override POST -> {}", method);
            *request.method_mut() = method;
        }
    }

    next.run(request).await
}

fn override_from_query(query: Option<&str>) -> Option<Method> {
    let query = query?;
    let (_, value) = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == METHOD_PARAM)?;

    match value.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_method_from_query() {
        assert_eq!(override_from_query(Some("_method=DELETE")), Some(Method::DELETE));
        assert_eq!(override_from_query(Some("a=1&_method=put")), Some(Method::PUT));
    }

    #[test]
    fn ignores_unknown_or_missing_methods() {
        assert_eq!(override_from_query(None), None);
        assert_eq!(override_from_query(Some("_method=GET")), None);
        assert_eq!(override_from_query(Some("method=DELETE")), None);
    }
}
