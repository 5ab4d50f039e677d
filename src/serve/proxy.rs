//! Routes of the dev server forwarded to another server, as listed in `apptime.server.*`.

use super::{SERVER, ServerResult};
use crate::config::ProxyRoute;
use anyhow::{Context, Result, ensure};
use axum::body::Body;
use axum::extract::State;
use axum::http::header::HOST;
use axum::http::{HeaderValue, Request, Response, Uri};
use axum::routing::{MethodRouter, any};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Where a proxied route is mounted on the dev server.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mount {
    /// Everything the dev server itself doesn't serve.
    Root,
    /// A path prefix, without trailing slash.
    Prefix(String),
}

impl Mount {
    fn parse(path: &str) -> Result<Self> {
        ensure!(
            path.starts_with('/'),
            "proxy path {path:?} must start with a `/`"
        );
        Ok(match path.trim_end_matches('/') {
            "" => Self::Root,
            prefix => Self::Prefix(prefix.to_string()),
        })
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("/"),
            Self::Prefix(prefix) => f.write_str(prefix),
        }
    }
}

/// A backend requests are forwarded to.
pub struct Proxy {
    client: reqwest::Client,
    backend: Uri,
    mount: Mount,
}

impl Proxy {
    /// Create the proxy of a route. It is mounted at `rewrite`, or else at the path of the backend.
    pub fn new(client: reqwest::Client, route: &ProxyRoute) -> Result<Arc<Self>> {
        let backend: Uri = route
            .backend
            .parse()
            .with_context(|| format!("invalid proxy backend {:?}", route.backend))?;
        ensure!(
            backend.scheme().is_some() && backend.authority().is_some(),
            "proxy backend {:?} must be an absolute URL",
            route.backend
        );
        let mount = Mount::parse(route.rewrite.as_deref().unwrap_or(backend.path()))?;

        Ok(Arc::new(Self {
            client,
            backend,
            mount,
        }))
    }

    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    /// The handler forwarding every method to the backend.
    pub fn service(self: Arc<Self>) -> MethodRouter {
        tracing::info!("{}proxying {} -> {}", SERVER, self.mount, self.backend);
        any(forward).with_state::<()>(self)
    }
}

/// Create the proxies of all routes, sharing one client.
///
/// At most one route may take the root, and no two routes may share a prefix.
pub fn proxies(routes: &[ProxyRoute]) -> Result<Vec<Arc<Proxy>>> {
    if routes.is_empty() {
        return Ok(Vec::new());
    }

    let client = reqwest::ClientBuilder::new()
        .http1_only()
        .build()
        .context("error building proxy client")?;

    let mut mounts = HashSet::new();
    routes
        .iter()
        .map(|route| {
            let proxy = Proxy::new(client.clone(), route)?;
            ensure!(
                mounts.insert(proxy.mount.clone()),
                "more than one proxy is mounted at {}",
                proxy.mount
            );
            Ok(proxy)
        })
        .collect()
}

#[tracing::instrument(level = "debug", skip_all, fields(uri = %req.uri()))]
async fn forward(
    State(proxy): State<Arc<Proxy>>,
    req: Request<Body>,
) -> ServerResult<Response<Body>> {
    let uri = backend_uri(&proxy.backend, req.uri())?;
    let (parts, body) = req.into_parts();

    let mut outbound = proxy
        .client
        .request(parts.method, uri.to_string())
        .headers(parts.headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .build()
        .context("error building request to proxy backend")?;
    if let Some(authority) = proxy.backend.authority() {
        if let Ok(host) = HeaderValue::from_str(authority.as_str()) {
            outbound.headers_mut().insert(HOST, host);
        }
    }

    let res = proxy
        .client
        .execute(outbound)
        .await
        .with_context(|| format!("error forwarding request to {uri}"))?;
    let mut response = Response::builder().status(res.status());
    if let Some(headers) = response.headers_mut() {
        headers.extend(res.headers().clone());
    }
    Ok(response
        .body(Body::from_stream(res.bytes_stream()))
        .context("error building proxy response")?)
}

/// The URI on the backend for a request: its path, without the mount prefix, follows the path of
/// the backend.
fn backend_uri(backend: &Uri, request: &Uri) -> Result<Uri> {
    let mut path_and_query = format!(
        "{}{}",
        backend.path().trim_end_matches('/'),
        request.path()
    );
    if let Some(query) = request.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    let mut parts = backend.clone().into_parts();
    parts.path_and_query = Some(
        path_and_query
            .parse()
            .with_context(|| format!("invalid proxied path {path_and_query:?}"))?,
    );
    Uri::from_parts(parts).context("error building backend URI")
}
