//! Health endpoints: liveness and readiness probes for orchestration.

use actix_web::{get, http::header, web, HttpResponse};
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready once the pool and services are built.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Readiness probe. 200 once dependencies are initialised, 503 before.
#[utoipa::path(
    get,
    path = "/readyz",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/readyz")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. 200 while the process is alive, 503 once draining.
#[utoipa::path(
    get,
    path = "/livez",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/livez")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, App};

    fn app(
        state: web::Data<HealthState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(state).service(ready).service(live)
    }

    #[actix_web::test]
    async fn readiness_flips_after_mark_ready() {
        let state = web::Data::new(HealthState::new());
        let service = actix_test::init_service(app(state.clone())).await;

        let before = actix_test::call_service(
            &service,
            actix_test::TestRequest::get().uri("/readyz").to_request(),
        )
        .await;
        assert_eq!(
            before.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );

        state.mark_ready();
        let after = actix_test::call_service(
            &service,
            actix_test::TestRequest::get().uri("/readyz").to_request(),
        )
        .await;
        assert!(after.status().is_success());
    }

    #[actix_web::test]
    async fn liveness_fails_once_unhealthy() {
        let state = web::Data::new(HealthState::new());
        let service = actix_test::init_service(app(state.clone())).await;

        let alive = actix_test::call_service(
            &service,
            actix_test::TestRequest::get().uri("/livez").to_request(),
        )
        .await;
        assert!(alive.status().is_success());

        state.mark_unhealthy();
        let draining = actix_test::call_service(
            &service,
            actix_test::TestRequest::get().uri("/livez").to_request(),
        )
        .await;
        assert_eq!(
            draining.status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
