// [apps/orchestrator/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: CRON AUTHENTICATION GUARD (V4.1)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: VALIDACIÓN DEL SECRETO DEL SCHEDULER
 *
 * El disparador de refresco sólo acepta al scheduler autenticado por
 * CRON_SECRET; la idempotencia ante disparos concurrentes la aporta el
 * candado de ciclo, no este guardia.
 * =================================================================
 */

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/**
 * Guardia del webhook: exige `Authorization: Bearer <CRON_SECRET>`.
 */
pub async fn cron_guard(
    State(application_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let bearer_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header_value| header_value.to_str().ok())
        .and_then(|header_text| header_text.strip_prefix("Bearer "));

    match bearer_token {
        Some(presented_secret) if presented_secret == application_state.cron_secret => {
            next.run(request).await
        }
        _ => {
            warn!("⛔ [CRON_GUARD]: Trigger rejected: invalid or missing bearer secret.");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "CRON_SECRET_REJECTED",
                })),
            )
                .into_response()
        }
    }
}
