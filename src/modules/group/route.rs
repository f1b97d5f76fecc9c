use crate::modules::group::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/groups")
            .service(create_group)
            .service(add_member)
            .service(list_groups)
            .service(delete_group),
    );
}
