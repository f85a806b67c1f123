// INICIO DEL ARCHIVO [apps/orchestrator/src/handlers/refresh.rs]
/*!
 * =================================================================
 * APARATO: REFRESH TRIGGER HANDLER (V4.3)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TRANSMUTACIÓN DEL VEREDICTO DEL CONDUCTOR A HTTP
 *
 * Contrato de estados:
 * - 200: ciclo promovido, sin cambios, o parcial por presupuesto; y
 *        también fallos de dominio (upstream / invariante) con
 *        success=false — el scheduler no debe reintentar en caliente.
 * - 207: hubo agregados forjados pero un sub-paso colapsó (chunks ZIP
 *        fallidos o renombrado de promoción).
 * - 503: ciclo en curso (candado sostenido).
 * - 500: colapso del estrato de persistencia.
 * =================================================================
 */

use crate::services::refresh_conductor::CycleBudget;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::{info, instrument};
use voltaic_domain_models::{CycleFault, CycleReport};

/**
 * Disparador del ciclo de refresco (webhook del scheduler).
 */
#[instrument(skip(application_state))]
pub async fn handle_refresh_trigger(
    State(application_state): State<AppState>,
) -> impl IntoResponse {
    info!("🔔 [TRIGGER]: Scheduler webhook accepted; conducting refresh tick...");

    let tick_budget = CycleBudget::for_host_ceiling();
    let verdict = application_state
        .refresh_conductor
        .execute_cycle(&tick_budget)
        .await;

    match verdict {
        Ok(report) => (StatusCode::OK, Json(report_payload(&report, true))).into_response(),

        Err(CycleFault::CycleInProgress) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "message": "cycle already in progress",
            })),
        )
            .into_response(),

        Err(CycleFault::StorageFault(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "message": format!("storage outage: {detail}"),
            })),
        )
            .into_response(),

        Err(fault @ CycleFault::PartialCompletion { .. })
        | Err(fault @ CycleFault::PromotionFailed(_)) => (
            StatusCode::MULTI_STATUS,
            Json(json!({
                "success": false,
                "message": fault.to_string(),
            })),
        )
            .into_response(),

        Err(domain_fault) => (
            StatusCode::OK,
            Json(json!({
                "success": false,
                "message": domain_fault.to_string(),
            })),
        )
            .into_response(),
    }
}

/// Cuerpo de respuesta de un ciclo sin fallo fatal.
fn report_payload(report: &CycleReport, success: bool) -> serde_json::Value {
    let mut payload = json!({
        "success": success,
        "message": report.message,
        "counts": {
            "inserted_stations": report.inserted,
            "rejected_records": report.rejected,
            "state_rows": report.state_rows,
            "county_rows": report.county_rows,
            "zip_rows": report.zip_rows,
        },
    });

    if let Some(completion) = report.completion {
        payload["partial"] = json!(completion);
    }
    if let Some(totals) = &report.detected {
        payload["counts"]["affected_states"] = json!(totals.affected_states);
        payload["counts"]["affected_counties"] = json!(totals.affected_counties);
        payload["counts"]["affected_zips"] = json!(totals.affected_zips);
    }

    payload
}
// FIN DEL ARCHIVO [apps/orchestrator/src/handlers/refresh.rs]
