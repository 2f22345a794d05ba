use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::body::Body;
use browser_rules::{DefaultParser, ParsedIdentity};
use config::GateConfig;
use http::{Request, Response, header, request::Parts};
use tower::Layer;

use super::{cookie, page};

/// Serves the unsupported browser page in place of the response for browsers
/// failing the configured requirements.
///
/// Requests reaching the inner service carry the [`ParsedIdentity`] of their
/// user agent in the request extensions.
#[derive(Clone)]
pub struct BrowserGateLayer(Arc<GateConfig>);

impl BrowserGateLayer {
    pub fn new(config: Arc<GateConfig>) -> Self {
        Self(config)
    }
}

impl<Service> Layer<Service> for BrowserGateLayer
where
    Service: Send + Clone,
{
    type Service = BrowserGateService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        BrowserGateService {
            next,
            gate: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub struct BrowserGateService<Service> {
    next: Service,
    gate: Arc<GateConfig>,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for BrowserGateService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut next = self.next.clone();
        let gate = self.gate.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            match inspect(&gate, &mut parts) {
                Verdict::Skip => next.call(Request::from_parts(parts, body)).await,
                Verdict::Pass { clear_cookie } => {
                    let mut response = next.call(Request::from_parts(parts, body)).await?;

                    if clear_cookie && let Some(value) = cookie::expired(&gate.cookie_name) {
                        response.headers_mut().append(header::SET_COOKIE, value);
                    }

                    Ok(response)
                }
                Verdict::Deny => {
                    let next_path = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

                    Ok(page::response(&gate, next_path))
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// The gate does not apply to this request.
    Skip,
    /// The browser may continue. A leftover opt-out cookie is cleared once the browser meets the requirements.
    Pass { clear_cookie: bool },
    /// The unsupported browser page replaces the response.
    Deny,
}

fn inspect(gate: &GateConfig, parts: &mut Parts) -> Verdict {
    if !gate.is_active() {
        return Verdict::Skip;
    }

    let path = parts.uri.path();

    if path == gate.path || path == gate.ignore_path() {
        return Verdict::Skip;
    }

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| parts.uri.authority().map(|authority| authority.as_str()));

    if gate.is_static(host, path) {
        return Verdict::Skip;
    }

    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty());

    let Some(user_agent) = user_agent else {
        return Verdict::Skip;
    };

    let identity: ParsedIdentity = browser_rules::normalize(Some(user_agent.into()), &DefaultParser).into_owned();
    let allowed = browser_rules::is_allowed(&identity, &gate.requirements);
    let opted_out = cookie::is_set(&parts.headers, &gate.cookie_name);

    if !allowed {
        log::debug!("Unsupported browser for {path}: {user_agent}");
    }

    parts.extensions.insert(identity);

    match (allowed, opted_out) {
        (true, clear_cookie) => Verdict::Pass { clear_cookie },
        (false, true) => Verdict::Pass { clear_cookie: false },
        (false, false) => Verdict::Deny,
    }
}
