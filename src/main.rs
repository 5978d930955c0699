use actix_web::{middleware, web, App, HttpServer};
use resource_directory::config::Settings;
use resource_directory::core::Matcher;
use resource_directory::routes::{self, AppState};
use resource_directory::services::{build_system_prompt, Catalog, CompletionClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting resource directory service...");

    let catalog = Catalog::load(&settings.catalog.path).map_err(|e| {
        error!("Failed to load catalog from {}: {}", settings.catalog.path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;

    info!("Catalog loaded: {} records", catalog.len());

    let llm = CompletionClient::new(settings.chat.completion()).map_err(|e| {
        error!("Failed to create completion client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    if !llm.is_configured() {
        // The service still matches and browses; /api/chat answers 500
        warn!("No completion API key configured, chat proxy will fail");
    }

    let system_prompt: Arc<str> = build_system_prompt(catalog.excerpt(settings.chat.excerpt_size)).into();

    let app_state = AppState {
        catalog: Arc::new(catalog),
        llm: Arc::new(llm),
        matcher: Matcher::default(),
        system_prompt,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(routes::cors())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
