use crate::modules::message::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/messages")
            .service(send_message)
            .service(get_history)
            .service(get_group_history)
            .service(edit_message)
            .service(delete_private_history)
            .service(delete_message)
            .service(mark_delivered)
            .service(mark_read)
            .service(mark_all_read),
    );
}
