use actix_cors::Cors;
use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lavka_disclaimer_backend::config::Config;
use lavka_disclaimer_backend::handlers;
use lavka_disclaimer_backend::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("
 _                _
| |    __ ___   _| | ____ _   disclaimers
| |   / _` \\ \\ / / |/ / _` |
| |__| (_| |\\ V /|   < (_| |
|_____\\__,_| \\_/ |_|\\_\\__,_|
");

    let port = config.port;
    let app_state = web::Data::new(AppState::new(config));

    if app_state.telegram.is_none() {
        warn!("BOT_TOKEN is not set, Telegram webhook is disabled");
    }
    info!(
        port,
        bot_enabled = app_state.telegram.is_some(),
        admins = app_state.config.admin_ids.len(),
        "starting server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
