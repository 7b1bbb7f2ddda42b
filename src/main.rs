use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tripsplit::settings::{Database, Settings};
use tripsplit::store::{MemoryTripStore, MongoTripStore, TripStore};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "tripsplit={level},actix_web={level}",
            level = settings.app.level
        )))
        .init();

    let store: Arc<dyn TripStore> = match &settings.database {
        Database::Memory => {
            tracing::warn!("using the in-memory store, trips are lost on shutdown");
            Arc::new(MemoryTripStore::new())
        }
        Database::Mongo { uri, name } => {
            tracing::info!("Using the following URI: {uri}");
            let store = MongoTripStore::connect(uri, name).await.map_err(|err| {
                tracing::error!("failed to connect to mongodb: {err}");
                err
            })?;
            tracing::info!("Connected");
            Arc::new(store)
        }
    };
    let store = web::Data::from(store);

    let addr = (settings.server.bind.clone(), settings.server.port);
    tracing::info!("listening on {}:{}", addr.0, addr.1);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(store.clone())
            .configure(tripsplit::routes::configure)
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
