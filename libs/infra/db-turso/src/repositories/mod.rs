// [libs/infra/db-turso/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY REGISTRY (V3.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTERS (ESTRATO L3)
 * RESPONSABILIDAD: AUTORIDADES DE PERSISTENCIA DEL ATLAS
 * =================================================================
 */

pub mod station;
pub mod aggregate;
pub mod reference_cache;
pub mod audit;
pub mod coordination;

pub use station::{StationRepository, StationStratum};
pub use aggregate::AggregateRepository;
pub use reference_cache::{CachedPopulation, ReferenceCacheRepository, POPULATION_TTL_DAYS};
pub use audit::ChangeLogRepository;
pub use coordination::{CoordinationRepository, CycleCheckpoint, LockAcquisition, CYCLE_LOCK_NAME};
