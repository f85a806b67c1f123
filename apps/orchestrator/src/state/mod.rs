// [apps/orchestrator/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: APPLICATION STATE (V4.0 - COMPOSITION ROOT)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ESTADO COMPARTIDO DEL ESTRATO HTTP
 * =================================================================
 */

use crate::services::refresh_conductor::RefreshConductor;
use std::sync::Arc;
use voltaic_infra_uplink::{CensusPopulationClient, StationRegistryClient, VmtUplinkClient};

/// Conductor con los gateways de producción inyectados.
pub type ProductionConductor =
    RefreshConductor<StationRegistryClient, CensusPopulationClient, VmtUplinkClient>;

/// Contenedor de estado compartido (thread-safe) del orquestador.
#[derive(Clone)]
pub struct AppState {
    /// Conductor del ciclo de refresco, compartido entre peticiones.
    pub refresh_conductor: Arc<ProductionConductor>,
    /// Secreto que gobierna el webhook del scheduler.
    pub cron_secret: String,
}
