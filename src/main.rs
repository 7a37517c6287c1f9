use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::info;

use peanut_suite::api;
use peanut_suite::api::health::AppStartTime;
use peanut_suite::attribution::AttributionCalculator;
use peanut_suite::cache::{MokaReportCache, NullReportCache, ReportCache};
use peanut_suite::config;
use peanut_suite::services::AttributionService;
use peanut_suite::storage::MemoryStore;
use peanut_suite::system::event::EventBus;
use peanut_suite::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    dotenvy::dotenv().ok();
    let app_config = config::init_config();
    if let Err(e) = app_config.validate() {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    let _log_guard = init_logging(app_config);

    let store = Arc::new(MemoryStore::new());
    let calculator = Arc::new(AttributionCalculator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        app_config.attribution.half_life_days,
    ));

    let report_cache: Arc<dyn ReportCache> = if app_config.cache.enabled {
        Arc::new(MokaReportCache::new(
            app_config.cache.max_capacity,
            app_config.cache.default_ttl,
        ))
    } else {
        info!("Report cache is disabled (CACHE_ENABLED=false)");
        Arc::new(NullReportCache::new())
    };

    let event_bus = Arc::new(EventBus::new());
    let service = Arc::new(AttributionService::new(
        calculator,
        store.clone(),
        store.clone(),
        report_cache,
        event_bus.clone(),
        app_config.cache.default_ttl,
    ));

    let bind_address = format!("{}:{}", app_config.server.host, app_config.server.port);
    info!("Starting server at http://{}", bind_address);
    info!(
        "Attribution half-life: {} days",
        app_config.attribution.half_life_days
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(event_bus.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
