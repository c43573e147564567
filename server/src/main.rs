use std::io;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use system::RoomStore;
use whiteboard_server::config::Config;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config =
        Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    log::info!("Starting with {:?}", config);

    let srv_tx = web::Data::new(spawn_server(RoomStore::new(config.retention)));
    let bind_address = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(srv_tx.clone())
            .app_data(config.clone())
            .configure(handlers::root)
    })
    .bind(bind_address)?
    .run()
    .await
}
