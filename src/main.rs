use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

mod api;
mod attendance;
mod config;
mod db;
mod docs;
mod model;
mod routes;
mod store;

use config::Config;
use db::init_db;
use store::{MemoryPunchStore, MySqlPunchStore, PunchStore};

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance service is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
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

    info!(
        check_in_target = config.policy.check_in_target,
        check_out_target = config.policy.check_out_target,
        "Server starting..."
    );

    let store: Arc<dyn PunchStore> = match &config.database_url {
        Some(url) => {
            let punch_store = MySqlPunchStore::new(init_db(url).await?);
            punch_store.ensure_schema().await?;
            Arc::new(punch_store)
        }
        None => {
            warn!("DATABASE_URL not set, imported punches are kept in memory only");
            Arc::new(MemoryPunchStore::new())
        }
    };

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let api_doc = docs::openapi(&config.api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(Data::new(config.policy))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
