use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};

use grid_dashboard::{api, config::AppConfig, db, services::ServiceRegistry};

#[get("/")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "Smart Grid Dashboard Backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let pool = db::init_pool(&config.database_url, config.pool_size).map_err(std::io::Error::other)?;
    let services = ServiceRegistry::from_config(&config);

    log::info!(
        "Starting Smart Grid Dashboard Backend at http://{}:{}",
        config.host,
        config.port
    );
    log::info!(
        "File store at {}, exports under {}/",
        services.files.describe(),
        services.export_dir
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(services.clone()))
            .service(health_check)
            .configure(api::config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
