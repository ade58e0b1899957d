use actix_web::web;

pub mod handlers;
use handlers::chat;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/chat", web::post().to(chat)));
}
