// [libs/domain/models-rs/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS REGISTRY (V3.0 - ATLAS ALIGNED)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: FUENTE ÚNICA DE VERDAD PARA LOS CONTRATOS DE DATOS
 * =================================================================
 */

pub mod station;
pub mod aggregate;
pub mod change;
pub mod cycle;
pub mod demographics;

pub use station::{
    RawFuelStationRecord, CanonicalStation, ChargerLevel, ConnectorType, RejectionReason,
};
pub use aggregate::{
    RegionAggregate, RegionKind, ChargerCensus, ConnectorCensus, PortCensus, ZoomRange,
};
pub use change::{
    ChangeManifest, ChangeTotals, CountyKey, ZipKey, StationDiff, ModifiedStationPair,
};
pub use cycle::{CyclePhase, CycleFault, CycleOutcome, CycleReport};
pub use demographics::{PopulationProvenance, PopulationRecord, CountyVmtRecord};
