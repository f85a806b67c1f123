// INICIO DEL ARCHIVO [libs/domain/models-rs/src/cycle.rs]
/*!
 * =================================================================
 * APARATO: REFRESH CYCLE CONTRACT (V2.6 - CONDUCTOR SEAL)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FASES, FALLOS Y REPORTE DEL CICLO DE REFRESCO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PERSISTED MACHINE: Las fases se serializan al checkpoint del
 *    Motor A para que un reinicio de proceso reanude, no re-ingiera.
 * 2. SINGLE SINK: Todo fallo bajo el conductor se transmuta a un
 *    CycleFault etiquetado; sólo el conductor decide tocar serving.
 * 3. SHELL PARITY: Cada fallo conoce su código de salida de shell.
 * =================================================================
 */

use crate::change::ChangeTotals;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typeshare::typeshare;

/// Fases de la máquina de estados del conductor de refresco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Idle,
    Ingesting,
    Detecting,
    AggregatingStates,
    AggregatingCounties,
    AggregatingZips,
    Promotable,
    Promoting,
}

impl CyclePhase {
    /// Etiqueta persistida en el checkpoint.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Ingesting => "ingesting",
            CyclePhase::Detecting => "detecting",
            CyclePhase::AggregatingStates => "aggregating_states",
            CyclePhase::AggregatingCounties => "aggregating_counties",
            CyclePhase::AggregatingZips => "aggregating_zips",
            CyclePhase::Promotable => "promotable",
            CyclePhase::Promoting => "promoting",
        }
    }

    /// Reconstruye la fase desde la etiqueta del checkpoint.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "idle" => Some(CyclePhase::Idle),
            "ingesting" => Some(CyclePhase::Ingesting),
            "detecting" => Some(CyclePhase::Detecting),
            "aggregating_states" => Some(CyclePhase::AggregatingStates),
            "aggregating_counties" => Some(CyclePhase::AggregatingCounties),
            "aggregating_zips" => Some(CyclePhase::AggregatingZips),
            "promotable" => Some(CyclePhase::Promotable),
            "promoting" => Some(CyclePhase::Promoting),
            _ => None,
        }
    }

    /// Una fase reanudable permite re-entrar al candado de ciclo en vez
    /// de rechazar el disparo con cycle-in-progress.
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        matches!(self, CyclePhase::AggregatingZips | CyclePhase::Promotable)
    }
}

/// Catálogo soberano de fallos del ciclo de refresco.
#[derive(Error, Debug)]
pub enum CycleFault {
    /// HTTP no-2xx, timeout o payload malformado del upstream tras reintentos.
    #[error("[L4_UPLINK_FAULT]: UPSTREAM_REGISTRY_SEVERED -> {0}")]
    UpstreamError(String),

    /// Invariante de ciclo violada (set truncado, totalidad de niveles).
    #[error("[L1_CYCLE_FAULT]: INVARIANT_VIOLATION -> {0}")]
    InvariantViolation(String),

    /// El conveyor ZIP cedió en una frontera de chunk; estado terminal
    /// pero no fatal. Transporta la razón de completitud [0,1).
    #[error("[L1_CYCLE_FAULT]: PARTIAL_ZIP_COMPLETION -> {completion:.3}")]
    PartialCompletion { completion: f64 },

    /// El renombrado atómico staging -> serving colapsó; el ciclo queda
    /// en Promotable y el siguiente tick reintenta.
    #[error("[L3_PROMOTION_FAULT]: TABLE_SWAP_COLLAPSED -> {0}")]
    PromotionFailed(String),

    /// El candado de coordinación ya está tomado por otro ciclo vivo.
    #[error("[L1_CYCLE_FAULT]: CYCLE_ALREADY_IN_PROGRESS")]
    CycleInProgress,

    /// Colapso del estrato de persistencia (Motor A inaccesible).
    #[error("[L3_STORAGE_FAULT]: PERSISTENCE_STRATA_OUTAGE -> {0}")]
    StorageFault(String),
}

impl CycleFault {
    /// Paridad con la superficie de shell del binario (§ contrato CLI):
    /// 0 éxito, 2 ciclo en curso, 3 upstream, 4 promoción, 5 parcial.
    #[must_use]
    pub fn shell_exit_code(&self) -> i32 {
        match self {
            CycleFault::CycleInProgress => 2,
            CycleFault::UpstreamError(_) => 3,
            CycleFault::PromotionFailed(_) => 4,
            CycleFault::PartialCompletion { .. } => 5,
            CycleFault::InvariantViolation(_) | CycleFault::StorageFault(_) => 1,
        }
    }
}

/// Desenlace de un ciclo que terminó sin fallo fatal.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Staging promovido a serving; la bitácora registra el ciclo.
    Promoted,
    /// El detector no encontró deltas; serving intacto.
    NoChanges,
    /// El conveyor ZIP cedió; el siguiente tick reanuda.
    Partial,
}

/// Reporte final de un ciclo, devuelto al disparador HTTP / CLI.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    #[serde(rename = "cycle_identifier")]
    pub cycle_id: String,
    pub outcome: CycleOutcome,
    pub message: String,

    #[serde(rename = "inserted_stations")]
    pub inserted: u32,
    #[serde(rename = "rejected_records")]
    pub rejected: u32,
    #[serde(rename = "state_rows")]
    pub state_rows: u32,
    #[serde(rename = "county_rows")]
    pub county_rows: u32,
    #[serde(rename = "zip_rows")]
    pub zip_rows: u32,

    /// Razón de completitud del conveyor ZIP cuando el desenlace es Partial.
    #[serde(rename = "zip_completion", skip_serializing_if = "Option::is_none")]
    pub completion: Option<f64>,

    #[serde(rename = "change_totals", skip_serializing_if = "Option::is_none")]
    pub detected: Option<ChangeTotals>,
}

impl CycleReport {
    /// Reporte de corte temprano: el detector no emitió deltas.
    #[must_use]
    pub fn no_changes(cycle_id: String, inserted: u32, rejected: u32) -> Self {
        Self {
            cycle_id,
            outcome: CycleOutcome::NoChanges,
            message: "no changes".to_string(),
            inserted,
            rejected,
            state_rows: 0,
            county_rows: 0,
            zip_rows: 0,
            completion: None,
            detected: None,
        }
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/cycle.rs]
