// INICIO DEL ARCHIVO [apps/orchestrator/src/services/zip_conveyor.rs]
/*!
 * =================================================================
 * APARATO: ZIP CONVEYOR SERVICE (V4.6 - COMPONENT G)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: RECÓMPUTO ZIP POR CHUNKS, REANUDABLE ENTRE TICKS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LEXICOGRAPHIC CHUNKS: 100 ZIPs por chunk en orden total del
 *    BTreeSet; la reanudación es determinista tick a tick.
 * 2. DEADLINE YIELD: El presupuesto se consulta SOLO en fronteras de
 *    chunk; el techo del host jamás interrumpe una escritura a medias.
 * 3. FAILURE RESIDUE: Un chunk fallido se registra y sus ZIPs quedan
 *    en el residuo para el siguiente tick; el conveyor no aborta.
 * =================================================================
 */

use crate::services::aggregation_forge::forge_row;
use crate::services::demographics::DemographicsOracle;
use crate::services::storage_fault;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use voltaic_core_geospatial::ZipCountyIndex;
use voltaic_domain_models::{CycleFault, RegionAggregate, RegionKind, ZipKey};
use voltaic_domain_refinement::{group_by_zip, tally_stations};
use voltaic_infra_db::repositories::{AggregateRepository, StationRepository};
use voltaic_infra_uplink::PopulationGateway;

/// ZIPs por chunk del conveyor.
pub const ZIP_CHUNK_SIZE: usize = 100;

/// Pausa entre chunks.
const INTER_CHUNK_PAUSE: Duration = Duration::from_millis(200);

/// Presupuesto de un tramo del conveyor. El techo de reloj del host se
/// modela como deadline; el Proving Grounds acota por conteo de chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkBudget {
    pub deadline: Option<Instant>,
    pub max_chunks: Option<usize>,
}

impl ChunkBudget {
    fn is_exhausted(&self, processed_chunks: usize) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        if let Some(max_chunks) = self.max_chunks {
            if processed_chunks >= max_chunks {
                return true;
            }
        }
        false
    }
}

/// Veredicto de un tramo del conveyor.
#[derive(Debug, Clone)]
pub enum ConveyorVerdict {
    /// Todo el residuo procesado; la puerta de promoción puede abrirse.
    Complete { zip_rows: u32 },
    /// El presupuesto se agotó en una frontera de chunk.
    BudgetExhausted {
        completion: f64,
        zip_rows: u32,
        remaining: BTreeSet<ZipKey>,
    },
    /// El presupuesto alcanzó pero hubo chunks fallidos; sus ZIPs
    /// permanecen en el residuo para el siguiente tick.
    ChunkFailures {
        completion: f64,
        zip_rows: u32,
        remaining: BTreeSet<ZipKey>,
    },
}

/// Conveyor de recómputo ZIP (componente G).
pub struct ZipConveyorService<'a, P: PopulationGateway> {
    station_repository: &'a StationRepository,
    aggregate_repository: &'a AggregateRepository,
    demographics_oracle: &'a DemographicsOracle<P>,
    zip_county_index: &'a ZipCountyIndex,
}

impl<'a, P: PopulationGateway> ZipConveyorService<'a, P> {
    #[must_use]
    pub fn new(
        station_repository: &'a StationRepository,
        aggregate_repository: &'a AggregateRepository,
        demographics_oracle: &'a DemographicsOracle<P>,
        zip_county_index: &'a ZipCountyIndex,
    ) -> Self {
        Self {
            station_repository,
            aggregate_repository,
            demographics_oracle,
            zip_county_index,
        }
    }

    /// Procesa el residuo de ZIPs por chunks hasta agotarlo o agotar
    /// el presupuesto. `affected_total` es la cardinalidad original
    /// del manifiesto, denominador de la razón de completitud.
    #[instrument(skip(self, residual_zips), fields(residual = residual_zips.len(), total = affected_total))]
    pub async fn convey(
        &self,
        residual_zips: &BTreeSet<ZipKey>,
        affected_total: usize,
        budget: &ChunkBudget,
    ) -> Result<ConveyorVerdict, CycleFault> {
        if residual_zips.is_empty() {
            return Ok(ConveyorVerdict::Complete { zip_rows: 0 });
        }

        info!(
            "📮 [CONVEYOR]: {} residual zips over {} affected; chunk size {}.",
            residual_zips.len(),
            affected_total,
            ZIP_CHUNK_SIZE
        );

        let ordered_chunks: Vec<Vec<ZipKey>> = residual_zips
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .chunks(ZIP_CHUNK_SIZE)
            .map(<[ZipKey]>::to_vec)
            .collect();

        let mut remaining: BTreeSet<ZipKey> = residual_zips.clone();
        let mut zip_rows_written = 0u32;
        let mut failed_chunk_count = 0usize;
        let mut processed_chunks = 0usize;

        for chunk in ordered_chunks {
            // El presupuesto sólo se consulta en fronteras de chunk.
            if budget.is_exhausted(processed_chunks) {
                let completion = completion_ratio(affected_total, remaining.len());
                info!(
                    "⏸️ [CONVEYOR]: Budget exhausted at chunk boundary. Completion {:.3}.",
                    completion
                );
                return Ok(ConveyorVerdict::BudgetExhausted {
                    completion,
                    zip_rows: zip_rows_written,
                    remaining,
                });
            }

            if processed_chunks > 0 {
                tokio::time::sleep(INTER_CHUNK_PAUSE).await;
            }

            match self.process_chunk(&chunk).await {
                Ok(written_rows) => {
                    zip_rows_written += written_rows;
                    for zip_key in &chunk {
                        remaining.remove(zip_key);
                    }
                }
                Err(chunk_fault) => {
                    // El fallo no aborta el conveyor; los ZIPs del chunk
                    // permanecen en el residuo y se reintentan luego.
                    failed_chunk_count += 1;
                    let chunk_zips: Vec<&str> =
                        chunk.iter().map(|key| key.zip.as_str()).collect();
                    warn!(
                        "🧯 [CONVEYOR]: Chunk collapsed ({}). Zips retained in residue: {:?}",
                        chunk_fault, chunk_zips
                    );
                }
            }

            processed_chunks += 1;
        }

        let completion = completion_ratio(affected_total, remaining.len());
        if remaining.is_empty() {
            info!("✅ [CONVEYOR]: Residue drained; {} zip rows crystallized.", zip_rows_written);
            Ok(ConveyorVerdict::Complete { zip_rows: zip_rows_written })
        } else {
            warn!(
                "⚠️ [CONVEYOR]: {} chunks failed; completion {:.3} with {} zips retained.",
                failed_chunk_count,
                completion,
                remaining.len()
            );
            Ok(ConveyorVerdict::ChunkFailures {
                completion,
                zip_rows: zip_rows_written,
                remaining,
            })
        }
    }

    /// Procesa un chunk completo: censo, poblaciones en lotes de 50,
    /// puntuación y reemplazo DELETE + INSERT.
    async fn process_chunk(&self, chunk: &[ZipKey]) -> Result<u32, CycleFault> {
        let chunk_stations = self
            .station_repository
            .staging_for_zip_keys(chunk)
            .await
            .map_err(storage_fault)?;

        let zip_groups = group_by_zip(&chunk_stations);
        let populations = self.demographics_oracle.populations_for_zips(chunk).await?;

        // VMT per cápita condal para los ZIPs que el índice conoce.
        let mut vmt_by_county: HashMap<String, Option<f64>> = HashMap::new();
        let mut forged_rows: Vec<RegionAggregate> = Vec::with_capacity(zip_groups.len());

        for (zip_key, members) in &zip_groups {
            let tally = tally_stations(members.iter().copied());

            let population = populations.get(zip_key);
            let (population_value, population_is_estimated) = match population {
                Some(record) => (record.value, record.is_estimate()),
                None => (
                    crate::services::demographics::COUNTY_ZIP_POPULATION_ESTIMATE,
                    true,
                ),
            };

            let vmt_per_capita = match self.zip_county_index.lookup(&zip_key.zip) {
                Some(entry) => {
                    let county_fips = entry.county_fips.clone();
                    match vmt_by_county.get(&county_fips) {
                        Some(cached_vmt) => *cached_vmt,
                        None => {
                            let fetched_vmt = self
                                .demographics_oracle
                                .county_vmt_per_capita(&county_fips)
                                .await?;
                            vmt_by_county.insert(county_fips, fetched_vmt);
                            fetched_vmt
                        }
                    }
                }
                None => None,
            };

            forged_rows.push(forge_row(
                RegionKind::Zip,
                zip_key.state.clone(),
                zip_key.zip.clone(),
                None,
                Some(zip_key.zip.clone()),
                &tally,
                population_value,
                population_is_estimated,
                vmt_per_capita,
            ));
        }

        // Los ZIPs del chunk sin estaciones restantes se borran de
        // staging; su ausencia tras la promoción es el estado correcto.
        self.purge_emptied_zips(chunk, &zip_groups).await?;

        let written = self
            .aggregate_repository
            .replace_zip_rows(&forged_rows)
            .await
            .map_err(crate::services::aggregation_forge::forge_sink_fault)?;

        Ok(written as u32)
    }

    /// DELETE de las filas staging de los ZIPs del chunk que quedaron
    /// sin estaciones (el reemplazo sólo borra lo que reescribe).
    async fn purge_emptied_zips(
        &self,
        chunk: &[ZipKey],
        zip_groups: &std::collections::BTreeMap<ZipKey, Vec<&voltaic_domain_models::CanonicalStation>>,
    ) -> Result<(), CycleFault> {
        for zip_key in chunk {
            if !zip_groups.contains_key(zip_key) {
                self.aggregate_repository
                    .delete_staging_zip_row(zip_key)
                    .await
                    .map_err(storage_fault)?;
            }
        }
        Ok(())
    }
}

/// Razón de completitud: ZIPs satisfechos sobre el total afectado.
fn completion_ratio(affected_total: usize, remaining: usize) -> f64 {
    if affected_total == 0 {
        return 1.0;
    }
    (affected_total - remaining.min(affected_total)) as f64 / affected_total as f64
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/zip_conveyor.rs]
