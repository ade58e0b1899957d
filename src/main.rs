use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use mobility_assistant::middlewares::RequestLogger;
use mobility_assistant::{api, AppConfig, ChatService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    if config.hf_token.is_none() {
        log::warn!("HUGGINGFACE_API_TOKEN is not set; chat requests will fail until it is");
    }

    let bind_addr = config.bind_addr.clone();
    let service = web::Data::new(ChatService::new(config));

    info!("Starting mobility assistant on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(service.clone())
            .configure(api::config)
    })
    .bind(bind_addr)?
    .run()
    .await
}
