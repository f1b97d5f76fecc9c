use actix::{Actor, Addr};
use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{connect_database, cors, init_logging, run_migrations},
    modules::{
        delivery::publisher::Publisher,
        friend::{handle::FriendSvc, repository_pg::FriendRepositoryPg},
        group::{handle::GroupSvc, repository_pg::GroupRepositoryPg},
        message::{handle::MessageSvc, repository_pg::MessageRepositoryPg},
        user::{
            repository_pg::UserRepositoryPg,
            service::{TokenSettings, UserService},
        },
        websocket::{handler::websocket_handler, server::WebSocketServer},
    },
};

mod api;
mod configs;
mod constants;
mod modules;
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging();

    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;
    run_migrations(&db_pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Database migration error: {e}")))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let group_repo = Arc::new(GroupRepositoryPg::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepositoryPg::new(db_pool.clone()));

    let ws_server: Addr<WebSocketServer> = WebSocketServer::new().start();
    let publisher: Arc<dyn Publisher> = Arc::new(ws_server.clone());

    let user_service = web::Data::new(UserService::with_dependencies(
        user_repo.clone(),
        TokenSettings {
            secret: ENV.jwt_secret.clone(),
            expiration: ENV.access_token_expiration,
        },
    ));
    let friend_service =
        web::Data::new(FriendSvc::with_dependencies(friend_repo, user_repo.clone()));
    let group_service =
        web::Data::new(GroupSvc::with_dependencies(group_repo.clone(), user_repo.clone()));
    let message_service = web::Data::new(MessageSvc::with_dependencies(
        message_repo,
        user_repo,
        group_repo,
        publisher,
    ));
    let ws_server = web::Data::new(ws_server);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(Logger::default())
            .app_data(user_service.clone())
            .app_data(friend_service.clone())
            .app_data(group_service.clone())
            .app_data(message_service.clone())
            .app_data(ws_server.clone())
            .service(health_check)
            .configure(modules::user::route::configure)
            .configure(modules::friend::route::configure)
            .configure(modules::group::route::configure)
            .configure(modules::message::route::configure)
            .route("/ws", web::get().to(websocket_handler))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
