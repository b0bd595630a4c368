use crate::{
    api::{admin_request, employee, export, gallon},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let gallon_limiter = Arc::new(build_limiter(config.rate_gallon_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Employee-facing kiosk routes (no login; identified by badge code)
    cfg.service(
        web::scope("/gallon")
            .wrap(gallon_limiter)
            // /gallon/employee?employee_id=EMP-001
            .service(web::resource("/employee").route(web::get().to(gallon::identify)))
            // /gallon/request
            .service(web::resource("/request").route(web::post().to(gallon::create_request)))
            // /gallon/pickup
            .service(web::resource("/pickup").route(web::patch().to(gallon::complete_pickup))),
    );

    // Protected console routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/requests")
                    // /requests?date=YYYY-MM-DD
                    .service(
                        web::resource("").route(web::get().to(admin_request::list_requests)),
                    )
                    // /requests/{id}  action: approve | reject | verify-stock
                    .service(
                        web::resource("/{id}")
                            .route(web::patch().to(admin_request::transition_request)),
                    ),
            )
            .service(
                web::scope("/exports")
                    .service(
                        web::resource("/daily-requests")
                            .route(web::get().to(export::daily_requests)),
                    )
                    .service(
                        web::resource("/monthly-activity")
                            .route(web::get().to(export::monthly_activity)),
                    ),
            ),
    );
}

// KIOSK FLOW
//  ├─ GET  /gallon/employee   (identify by badge code)
//  ├─ POST /gallon/request    (claim against remaining allowance)
//  └─ PATCH /gallon/pickup    (confirm pickup once stock is verified)

// CONSOLE FLOW
//  └─ PATCH /api/requests/{id}
//       ├─ approve       (administrator)
//       ├─ reject        (administrator, notes required)
//       └─ verify-stock  (warehouse)
