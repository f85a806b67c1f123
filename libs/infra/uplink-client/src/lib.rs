// [libs/infra/uplink-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: UPLINK CLIENT REGISTRY (V3.0 - TRIPLE TUNNEL)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: TÚNELES HTTP SALIENTES Y SUS CONTRATOS DE PRUEBA
 *
 * Los traits de gateway son la costura de pruebas: el Proving Grounds
 * inyecta dobles deterministas; producción inyecta los clientes reales.
 * =================================================================
 */

pub mod errors;
pub mod backoff;
pub mod registry;
pub mod census;
pub mod vmt;

pub use errors::UplinkError;
pub use backoff::{retry_with_backoff, RETRY_DELAY_LADDER, UPLINK_TIMEOUT};
pub use registry::{RegistrySource, StationRegistryClient, DEFAULT_REGISTRY_URL};
pub use census::{CensusPopulationClient, PopulationFetch, PopulationGateway, DEFAULT_CENSUS_URL, ZIP_BATCH_CEILING};
pub use vmt::{VmtGateway, VmtUplinkClient, DEFAULT_VMT_URL};
