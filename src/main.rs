use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

use erp::config::Config;
use erp::db::init_db;
use erp::docs::ApiDoc;
use erp::routes;
use erp::services::users::ensure_bootstrap_admin;
use erp::store::{MemoryStore, MySqlStore, SharedStore, Store};
use erp::utils::username_index::UsernameIndex;

use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store: SharedStore = if config.uses_memory_store() {
        warn!("DATABASE_URL=memory: selected, data lives only as long as the process");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(MySqlStore::new(init_db(&config.database_url).await?))
    };
    let index = UsernameIndex::new();

    if let Some((username, password)) = &config.bootstrap_admin {
        match ensure_bootstrap_admin(store.as_ref(), &index, username, password).await {
            Ok(true) => info!(username = %username, "Bootstrap admin created"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to create bootstrap admin"),
        }
    }

    {
        let store = store.clone();
        let index = index.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = index.warmup_filter(store.as_ref(), 100).await {
                error!(error = ?e, "Failed to warmup username filter");
            }
        });
    }

    {
        let store = store.clone();
        let index = index.clone();
        let days = config.username_warmup_days;
        actix_web::rt::spawn(async move {
            // Recent logins in batches of 250
            if let Err(e) = index.warmup_cache(store.as_ref(), days, 250).await {
                error!(error = ?e, "Failed to warmup username cache");
            }
        });
    }

    let server_addr = config.server_addr.clone();
    let store_data: Data<dyn Store> = Data::from(store);
    let index_data = Data::new(index);
    let config_data = Data::new(config);

    HttpServer::new(move || {
        let routes_config = config_data.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store_data.clone())
            .app_data(index_data.clone())
            .app_data(config_data.clone())
            // Configure auth + protected routes with rate limiting
            .configure(move |cfg| routes::configure(cfg, &routes_config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
