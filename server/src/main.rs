use actix_web::{web, App, HttpServer};

use whiteboard_server::connection::ws_index;
use whiteboard_server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let srv_tx = spawn_server();

    HttpServer::new(move || {
        App::new()
            .data(srv_tx.clone())
            .route("/ws/{room_id}/", web::get().to(ws_index))
    })
    .bind("127.0.0.1:8080")?
    .run()
    .await
}
