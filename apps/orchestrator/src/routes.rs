// INICIO DEL ARCHIVO [apps/orchestrator/src/routes.rs]
/*!
 * =================================================================
 * APARATO: ATLAS ROUTING MATRIX (V4.2)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA HTTP DEL ORQUESTADOR
 *
 * Superficie mínima por diseño: el webhook del scheduler (guardado por
 * CRON_SECRET) y el pulso de salud. La ruta de lectura del atlas vive
 * en un colaborador externo.
 * =================================================================
 */

use crate::handlers::refresh;
use crate::middleware::cron_guard;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_atlas_router(application_state: AppState) -> Router {
    // Escudo de red para las herramientas de operaciones.
    let network_security_shield = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    // ESTRATO INTERNO: disparo del ciclo, gobernado por CRON_SECRET.
    let internal_stratum = Router::new()
        .route("/refresh", post(refresh::handle_refresh_trigger))
        .route_layer(middleware::from_fn_with_state(
            application_state.clone(),
            cron_guard,
        ));

    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .nest("/internal", internal_stratum)
        .layer(network_security_shield)
        .layer(TraceLayer::new_for_http())
        .with_state(application_state)
}
// FIN DEL ARCHIVO [apps/orchestrator/src/routes.rs]
