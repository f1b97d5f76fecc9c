use crate::modules::user::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/users")
            .service(register)
            .service(login)
            .service(search)
            .service(get_user)
            .service(update_user)
            .service(delete_user)
            .service(heartbeat),
    );
}
