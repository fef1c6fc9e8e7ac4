use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use islandhop_pooling::config::Settings;
use islandhop_pooling::core::PoolMatcher;
use islandhop_pooling::routes::{self, AppState};
use islandhop_pooling::services::{
    CacheManager, Cached, InMemoryPoolRepository, PoolRepository, PoolingService,
    PostgresPoolRepository, TripServiceClient, UserServiceClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| startup_error("Configuration error", e))?;

    // Initialize logging (LOG_LEVEL / LOG_FORMAT override the config file)
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.logging.level))
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting IslandHop pooling service...");
    info!("Configuration loaded successfully");

    // Initialize cache manager (Redis is optional)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!(
                    "Cache manager initialized (L1: {} entries, TTL: {}s, Redis enabled)",
                    l1_cache_size, cache_ttl
                );
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };
    let cache = Arc::new(cache);

    // Initialize upstream clients
    let timeout = settings.services.timeout_secs;
    let trip_client = TripServiceClient::new(settings.services.trip_service_url.clone(), timeout)
        .map_err(|e| startup_error("Failed to create trip service client", e))?;
    let user_client = UserServiceClient::new(settings.services.user_service_url.clone(), timeout)
        .map_err(|e| startup_error("Failed to create user service client", e))?;

    if !trip_client.is_healthy().await {
        warn!("Trip service at {} is not responding yet", settings.services.trip_service_url);
    }

    // Initialize pool storage
    let repository: Arc<dyn PoolRepository> = match &settings.database.url {
        Some(url) => {
            let max_conn = settings.database.max_connections.unwrap_or(10);
            let min_conn = settings.database.min_connections.unwrap_or(1);
            let postgres = PostgresPoolRepository::new(url, max_conn, min_conn)
                .await
                .map_err(|e| startup_error("PostgreSQL connection error", e))?;
            info!("PostgreSQL pool repository initialized (max: {} connections)", max_conn);
            Arc::new(postgres)
        }
        None => {
            warn!("No database configured, pools will not survive a restart");
            Arc::new(InMemoryPoolRepository::new())
        }
    };

    let matching = settings.pooling.matching_config();
    info!("Matcher initialized with config: {:?}", matching);

    let pooling = PoolingService::new(
        Arc::new(Cached::new(trip_client, cache.clone())),
        Arc::new(Cached::new(user_client, cache)),
        repository,
        PoolMatcher::new(matching),
        settings.pooling.limits(),
    );

    // Build application state
    let app_state = AppState {
        pooling: Arc::new(pooling),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
