mod hmr;
mod proxy;
mod template;

pub use hmr::HmrState;
pub use template::PageTemplate;

use crate::common::{LOCAL, SERVER};
use crate::compiler::Compiler;
use crate::config::{APP_ENTRY, AppContext, AppPaths, Configuration, ServerCustomization};
use crate::watch::{WatchOptions, WatchSystem};
use anyhow::{Context, Result, ensure};
use axum::body::Body;
use axum::extract;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{Router, get, get_service};
use axum_server::Handle;
use proxy::Mount;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Where the vendor DLL is served.
pub const VENDOR_PATH: &str = "/vendor.dll.js";

/// A system encapsulating a watch system, responsible for serving the dev bundle, the vendor DLL,
/// the page shell and the hot reload stream.
pub struct ServeSystem<C> {
    watch: WatchSystem<C>,
    server: ServerSettings,
    /// Open the browser once the server is listening.
    open: bool,
    shutdown_tx: broadcast::Sender<()>,
    hmr: watch::Receiver<HmrState>,
}

/// Everything the HTTP server is built from.
struct ServerSettings {
    paths: AppPaths,
    port: u16,
    bundle_url: String,
    template: PageTemplate,
    customization: ServerCustomization,
}

impl<C: Compiler + Send + Sync + 'static> ServeSystem<C> {
    /// Construct a new instance.
    ///
    /// Fails when the page template or the server customization of the app can't be loaded.
    pub async fn new(
        compiler: C,
        config: Configuration,
        ctx: &AppContext,
        options: WatchOptions,
        open: bool,
        shutdown: broadcast::Sender<()>,
    ) -> Result<Self> {
        let template = PageTemplate::load(ctx.paths.app_dir()).await?;
        let customization = ServerCustomization::load(ctx.paths.app_dir())?;

        let (hmr_tx, hmr) = watch::channel(HmrState::default());
        let watch = WatchSystem::new(compiler, config, options, hmr_tx, shutdown.subscribe());

        Ok(Self {
            watch,
            server: ServerSettings {
                paths: ctx.paths.clone(),
                port: ctx.dev_server.port,
                bundle_url: format!("{}{APP_ENTRY}.js", ctx.dev_server.host),
                template,
                customization,
            },
            open,
            shutdown_tx: shutdown,
            hmr,
        })
    }

    /// Run the serve system.
    #[tracing::instrument(level = "trace", skip(self))]
    pub async fn run(self) -> Result<()> {
        let open_http_addr = format!("http://localhost:{}/", self.server.port);

        // Spawn the watcher & the server.
        let watch_handle = tokio::spawn(self.watch.run());
        let (server_handle, listening) =
            spawn_server(self.server, self.hmr, self.shutdown_tx.subscribe())?;

        // Open the browser.
        if self.open {
            tokio::spawn(async move {
                if listening.listening().await.is_some() {
                    if let Err(err) = open::that(&open_http_addr) {
                        tracing::error!(error = ?err, "error opening browser");
                    }
                }
            });
        }
        drop(self.shutdown_tx); // Drop the broadcast channel to ensure it does not keep the system alive.

        select! {
            r = watch_handle => {
                match r {
                    Err(err) => {
                        tracing::error!(error = ?err, "error joining watch system handle");
                        Err(err)
                    }
                    _ => r,
                }??;
            },
            r = server_handle => {
                match r {
                    Err(err) => {
                        tracing::error!(error = ?err, "error joining server handle");
                        Err(err)
                    }
                    _ => r,
                }??;
            },
        }

        Ok(())
    }
}

#[tracing::instrument(level = "trace", skip_all)]
fn spawn_server(
    settings: ServerSettings,
    hmr: watch::Receiver<HmrState>,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<(JoinHandle<Result<()>>, Handle)> {
    let state = Arc::new(State {
        template: settings.template,
        bundle_url: settings.bundle_url,
        hmr,
    });
    let router = router(state, &settings.paths, &settings.customization)?;

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), settings.port);
    tracing::info!("{}server listening at:", SERVER);
    tracing::info!("    {}http://localhost:{}/", LOCAL, settings.port);

    let handle = Handle::new();
    let server = run_server(addr, router, handle.clone(), shutdown_rx);

    Ok((
        tokio::spawn(async move {
            match server.await {
                Err(err) => {
                    tracing::error!(error = ?err, "error from server task");
                    Err(err)
                }
                r => r,
            }
        }),
        handle,
    ))
}

async fn run_server(
    addr: SocketAddr,
    router: Router,
    handle: Handle,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let shutdown = |handle: Handle| async move {
        // Any event on this channel, even a drop, should trigger shutdown.
        let _res = shutdown_rx.recv().await;
        tracing::debug!("server is shutting down");
        handle.graceful_shutdown(Some(Duration::from_secs(0)));
    };

    tokio::spawn(shutdown(handle.clone()));

    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .with_context(|| format!("error serving on {addr}"))
}

/// Server state.
pub struct State {
    /// The page shell served for any unknown GET.
    pub template: PageTemplate,
    /// The public URL of the app bundle.
    pub bundle_url: String,
    /// The latest state of the dev compiler.
    pub hmr: watch::Receiver<HmrState>,
}

/// Build the dev server router: the hot reload stream, the vendor DLL, the dev bundle with the
/// page shell as fallback, as well as any user-defined proxies.
///
/// A proxy mounted at the root takes the place of the page shell.
fn router(
    state: Arc<State>,
    paths: &AppPaths,
    customization: &ServerCustomization,
) -> Result<Router> {
    let mut root = None;
    let mut prefixed = Vec::new();
    for proxy in proxy::proxies(&customization.proxies)? {
        match proxy.mount() {
            Mount::Root => root = Some(proxy),
            Mount::Prefix(prefix) => {
                ensure!(
                    ![hmr::HMR_PATH, VENDOR_PATH].contains(&prefix.as_str()),
                    "proxy path {prefix:?} is reserved by the dev server"
                );
                let prefix = prefix.clone();
                prefixed.push((prefix, proxy));
            }
        }
    }

    let fallback = match root {
        Some(proxy) => proxy.service(),
        None => get(render_shell).with_state::<()>(state.clone()),
    };
    let assets = get_service(
        ServeDir::new(paths.dev_output())
            .call_fallback_on_method_not_allowed(true)
            .fallback(fallback),
    )
    .handle_error(|error| async move {
        tracing::error!(?error, "failed serving static file");
        StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut router = Router::new()
        .route(hmr::HMR_PATH, get(hmr::handle_sse))
        .route_service(VENDOR_PATH, ServeFile::new(paths.vendor_dll()))
        .fallback_service(assets)
        .with_state(state);

    for (prefix, proxy) in prefixed {
        router = router.nest_service(&prefix, proxy.service());
    }

    for (key, value) in &customization.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .with_context(|| format!("invalid header {:?}", key))?;
        let value: HeaderValue = value
            .parse()
            .with_context(|| format!("invalid header value {:?} for header {}", value, name))?;
        router = router.layer(SetResponseHeaderLayer::overriding(name, value));
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

async fn render_shell(extract::State(state): extract::State<Arc<State>>) -> Html<String> {
    Html(state.template.render(&state.bundle_url, VENDOR_PATH))
}

/// A result type used to work seamlessly with axum.
pub(crate) type ServerResult<T> = std::result::Result<T, ServerError>;

/// A newtype to make anyhow errors work with axum.
pub(crate) struct ServerError(pub anyhow::Error);

impl From<anyhow::Error> for ServerError {
    fn from(src: anyhow::Error) -> Self {
        ServerError(src)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "error handling request");
        let mut res = Response::new(Body::empty());
        *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        res
    }
}
