use axum::{body::Body, http::HeaderMap, middleware::Next, response::Response};

use crate::context::ActorContext;

pub const ACTOR_HEADER: &str = "x-changed-by";

/// Attach an [`ActorContext`] to every request.
pub async fn actor_middleware(mut req: axum::http::Request<Body>, next: Next) -> Response {
    let actor = extract_actor(req.headers());
    req.extensions_mut().insert(ActorContext::new(actor));
    next.run(req).await
}

fn extract_actor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_trimmed_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_actor(&headers), None);
        headers.insert(ACTOR_HEADER, HeaderValue::from_static(" bob "));
        assert_eq!(extract_actor(&headers), Some("bob".to_string()));
    }
}
