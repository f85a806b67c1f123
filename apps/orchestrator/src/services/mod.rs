// [apps/orchestrator/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: PIPELINE SERVICE REGISTRY (V4.0)
 * CLASIFICACIÓN: APPLICATION SERVICES (ESTRATO L1-APP)
 * RESPONSABILIDAD: SERVICIOS DEL CICLO DE REFRESCO (A, C, D, E, G, H)
 * =================================================================
 */

pub mod demographics;
pub mod ingestion;
pub mod change_sentinel;
pub mod aggregation_forge;
pub mod zip_conveyor;
pub mod refresh_conductor;

pub use demographics::DemographicsOracle;
pub use ingestion::{IngestionOutcome, RegistryIngestionService};
pub use change_sentinel::ChangeSentinelService;
pub use aggregation_forge::AggregationForgeService;
pub use zip_conveyor::{ChunkBudget, ConveyorVerdict, ZipConveyorService};
pub use refresh_conductor::{CycleBudget, RefreshConductor};

use voltaic_domain_models::CycleFault;
use voltaic_infra_db::DbError;
use voltaic_infra_uplink::UplinkError;

/// Transmuta un fallo de persistencia al catálogo del ciclo.
pub(crate) fn storage_fault(fault: DbError) -> CycleFault {
    CycleFault::StorageFault(fault.to_string())
}

/// Transmuta un fallo del túnel saliente al catálogo del ciclo.
pub(crate) fn upstream_fault(fault: UplinkError) -> CycleFault {
    CycleFault::UpstreamError(fault.to_string())
}
