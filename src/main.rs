use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use serde_json::json;

mod comment;
mod config;
mod middleware;
mod post;
mod router;
mod storage;
mod subscription;
mod utils;

use comment::service::CommentService;
use config::Config;
use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use post::service::PostService;
use router::index::routes;
use subscription::hub::NotificationHub;
use utils::helpers::service_name;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Blog comment service is running",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": service_name(),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::other(e.to_string())
    })?;
    info!("Loaded configuration: {:?}", config);

    // a durable backend that cannot be reached is fatal; no fallback to memory
    let store = storage::init_storage(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let hub = NotificationHub::new();
    let post_service = web::Data::new(PostService::new(store.clone()));
    let comment_service = web::Data::new(CommentService::new(store, hub));

    info!("Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
