//! Service entry-point: wires the cache tiers, the Overpass source, and
//! the REST endpoints.

use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use backend::Trace;
use backend::api::health::{HealthState, live, ready};
use backend::config::GraphServiceSettings;
use ortho_config::OrthoConfig;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::GraphService;
use backend::domain::ports::GraphCache;
use backend::inbound::http::{self, HttpState};
use backend::outbound::cache::{DiskGraphCache, NoopGraphCache, RedisGraphCache};
use backend::outbound::overpass::OverpassHttpSource;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = GraphServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;

    let state = build_state(&settings).await?;
    let bind_addr = settings.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), state.clone())
    })
    .bind(bind_addr.as_str())?;

    health_state.mark_ready();
    info!(%bind_addr, "graph service listening");
    server.run().await
}

/// Construct the adapters and the orchestrator from settings.
///
/// The fast tier is resolved once here: a configured, reachable Redis
/// becomes the shared tier, anything else becomes a no-op cache. The
/// orchestrator never branches on tier presence afterwards.
async fn build_state(settings: &GraphServiceSettings) -> io::Result<HttpState> {
    let fast: Arc<dyn GraphCache> = match settings.redis_url() {
        Some(url) => {
            match RedisGraphCache::connect(url, settings.cache_ttl(), settings.cache_op_timeout())
                .await
            {
                Ok(cache) => Arc::new(cache),
                Err(error) => {
                    warn!(%error, "fast cache tier unavailable, continuing with disk cache only");
                    Arc::new(NoopGraphCache::new())
                }
            }
        }
        None => Arc::new(NoopGraphCache::new()),
    };

    let durable = DiskGraphCache::open(settings.cache_dir())?;

    let overpass_url = settings
        .overpass_url()
        .map_err(|e| io::Error::other(format!("invalid Overpass URL: {e}")))?;
    let source = OverpassHttpSource::new(overpass_url, settings.fetch_timeout())
        .map_err(|e| io::Error::other(format!("failed to build Overpass client: {e}")))?;

    let service = GraphService::new(fast, Arc::new(durable), Arc::new(source));
    Ok(HttpState::new(Arc::new(service)))
}

fn build_app(
    health_state: web::Data<HealthState>,
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(http::routes)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}
