use crate::{
    api::{attendance, finance, grades, proxy},
    auth::{handlers, middleware::session_middleware},
    config::Config,
    error::PortalError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Per-route limiter, keyed by peer IP
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap_or_default();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(web::resource("/logout").route(web::post().to(handlers::logout))),
    );

    cfg.service(web::resource("/graphql").route(web::post().to(proxy::forward)));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(session_middleware))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                PortalError::InvalidInput(err.to_string()).into()
            }))
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(web::resource("/absensi").route(web::get().to(attendance::list_attendance)))
            .service(web::resource("/nilai").route(web::get().to(grades::list_grades)))
            .service(web::resource("/keuangan").route(web::get().to(finance::finance_report))),
    );
}
