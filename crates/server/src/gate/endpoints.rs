use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Query, State},
    response::Response,
    routing::get,
};
use config::GateConfig;
use http::{HeaderValue, StatusCode, header};
use serde::Deserialize;

use super::{cookie, page};

#[derive(Debug, Default, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// The unsupported browser page and the endpoint opting out of the gate.
pub(crate) fn routes(gate: Arc<GateConfig>) -> Router {
    Router::new()
        .route(&gate.path, get(unsupported))
        .route(&gate.ignore_path(), get(ignore))
        .with_state(gate)
}

async fn unsupported(State(gate): State<Arc<GateConfig>>, Query(query): Query<NextQuery>) -> Response {
    page::response(&gate, page::safe_next(query.next.as_deref()))
}

async fn ignore(State(gate): State<Arc<GateConfig>>, Query(query): Query<NextQuery>) -> Response {
    let next = page::safe_next(query.next.as_deref());
    let location = HeaderValue::from_str(next).unwrap_or_else(|_| HeaderValue::from_static("/"));

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FOUND;
    response.headers_mut().insert(header::LOCATION, location);

    match cookie::opt_out(&gate.cookie_name) {
        Some(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        None => log::warn!("Cookie name '{}' cannot be used in a header", gate.cookie_name),
    }

    response
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use config::GateConfig;
    use http::{Request, StatusCode, header};
    use tower::ServiceExt;

    async fn get(uri: &str) -> http::Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

        super::routes(Arc::new(GateConfig::default()))
            .oneshot(request)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn ignore_sets_cookie_and_redirects() {
        let response = get("/badbrowser/ignore?next=%2Faccount%3Ftab%3D1").await;

        assert_eq!(response.status(), StatusCode::FOUND);

        insta::assert_debug_snapshot!(
            (&response.headers()[header::LOCATION], &response.headers()[header::SET_COOKIE]),
            @r#"
        (
            "/account?tab=1",
            "badbrowser_ignore=1; Path=/; SameSite=Lax",
        )
        "#
        );
    }

    #[tokio::test]
    async fn ignore_without_next_goes_home() {
        let response = get("/badbrowser/ignore").await;
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn ignore_refuses_foreign_next() {
        let response = get("/badbrowser/ignore?next=https%3A%2F%2Fevil.example.com%2F").await;
        assert_eq!(response.headers()[header::LOCATION], "/");

        let response = get("/badbrowser/ignore?next=%2F%2Fevil.example.com").await;
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn unsupported_page() {
        let response = get("/badbrowser?next=%2Fdocs").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(body.contains(r#"href="/badbrowser/ignore?next=%2Fdocs""#));
    }
}
