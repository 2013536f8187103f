use axum::http::{HeaderName, Request};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use link_core::{LinkApp, LinkResult};
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{api, auth, serve, LinkAxumState};

const REQUEST_ID: &str = "x-request-id";

/// Fresh UUID v4 for requests that arrive without an id.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

pub struct LinkAxumApp {
    pub state: LinkAxumState,
    pub router: Router<()>,
}

impl Clone for LinkAxumApp {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            router: self.router.clone(),
        }
    }
}

impl LinkAxumApp {
    pub fn new(state: LinkAxumState) -> Self {
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

fn build_router(state: LinkAxumState) -> Router<()> {
    let api = Router::new()
        .route(
            "/links",
            get(api::list_links)
                .post(api::create_link)
                .delete(api::delete_link),
        )
        .route("/links/upload", post(api::upload_link))
        .fallback(api::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let request_id = HeaderName::from_static(REQUEST_ID);

    Router::new()
        .route("/", get(serve::root))
        .nest("/api", api)
        .fallback(serve::serve_link)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
}

/// Router over `app`, configured from its settings.
pub fn axum(app: LinkApp) -> LinkResult<LinkAxumApp> {
    Ok(LinkAxumApp::new(LinkAxumState::from_app(app)?))
}
