use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use intergen_match::config::Settings;
use intergen_match::core::Matcher;
use intergen_match::routes::{self, AppState};
use intergen_match::services::{
    CacheManager, ProfileStore, SessionVerifier, SnapshotLoader, SupabaseClient, SupabaseTables,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Initialize logging; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting Intergen matching service...");

    // Initialize Supabase client
    let timeout = Duration::from_secs(settings.supabase.timeout_secs.unwrap_or(30));
    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.api_key.clone(),
        timeout,
        SupabaseTables::default(),
    )
    .map_err(|e| {
        error!("Failed to create Supabase client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let store: Arc<dyn ProfileStore> = Arc::new(supabase);

    info!("Supabase client initialized for {}", settings.supabase.url);

    // Initialize cache manager; Redis is optional
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(60);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, Redis L2, TTL: {}s)", l1_cache_size, cache_ttl);
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

    info!("Cache stats: {:?}", cache.stats());

    let snapshots = SnapshotLoader::new(
        store,
        Some(Arc::new(cache)),
        settings.matching.fetch_concurrency,
    );

    // Session verification
    let session = settings
        .auth
        .jwt_secret
        .as_deref()
        .map(|secret| SessionVerifier::new(secret, settings.auth.audience.as_deref()));

    if session.is_none() {
        warn!("No JWT secret configured; viewers are identified by the userId in the request body");
    }

    // Initialize matcher with configured policy
    let policy = settings.scoring.policy();
    let matcher = Matcher::new(policy);

    info!("Matcher initialized with policy: {:?}", policy);

    // Build application state
    let app_state = AppState {
        snapshots,
        session,
        matcher,
        matching: settings.matching.clone(),
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
            .configure(routes::configure_extractors)
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
