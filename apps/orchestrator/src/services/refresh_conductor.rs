// INICIO DEL ARCHIVO [apps/orchestrator/src/services/refresh_conductor.rs]
/*!
 * =================================================================
 * APARATO: REFRESH CONDUCTOR SERVICE (V4.8 - COMPONENT H)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: MÁQUINA DE ESTADOS DEL CICLO Y PUERTA DE PROMOCIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE SINK: Sólo este conductor decide tocar serving; todo lo
 *    demás es efecto sobre staging, descartable sin riesgo.
 * 2. PERSISTED MACHINE: Cada transición cristaliza el checkpoint; un
 *    reinicio de proceso reanuda en AggregatingZips o Promotable en
 *    vez de re-ingerir.
 * 3. LOCK RE-ENTRY: Un candado sostenido cuyo ciclo coincide con un
 *    checkpoint reanudable se re-entra; cualquier otro contendiente
 *    recibe cycle-in-progress.
 * 4. TRUNCATION SHIELD: |staging| > 0.5 · |serving| o el ciclo aborta
 *    sin tocar serving (un censo upstream truncado jamás promociona).
 * =================================================================
 */

use crate::services::aggregation_forge::AggregationForgeService;
use crate::services::change_sentinel::ChangeSentinelService;
use crate::services::demographics::DemographicsOracle;
use crate::services::ingestion::RegistryIngestionService;
use crate::services::storage_fault;
use crate::services::zip_conveyor::{ChunkBudget, ConveyorVerdict, ZipConveyorService};
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use voltaic_core_geospatial::{CountyTopology, ZipCountyIndex};
use voltaic_domain_models::{
    ChangeManifest, CycleFault, CycleOutcome, CyclePhase, CycleReport, ZipKey,
};
use voltaic_infra_db::repositories::{
    AggregateRepository, ChangeLogRepository, CoordinationRepository, CycleCheckpoint,
    LockAcquisition, ReferenceCacheRepository, StationRepository, StationStratum,
};
use voltaic_infra_db::{PromotionAuthority, TursoClient};
use voltaic_infra_uplink::{PopulationGateway, RegistrySource, VmtGateway};

/// Margen de seguridad bajo el techo de 5 minutos del host.
const HOST_CEILING_MARGIN: Duration = Duration::from_secs(270);

/// Presupuesto de un tick completo del conductor.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleBudget {
    pub zip_budget: ChunkBudget,
}

impl CycleBudget {
    /// Presupuesto de producción: el conveyor cede antes del techo de
    /// reloj del host (5 min) con margen para la promoción.
    #[must_use]
    pub fn for_host_ceiling() -> Self {
        Self {
            zip_budget: ChunkBudget {
                deadline: Some(Instant::now() + HOST_CEILING_MARGIN),
                max_chunks: None,
            },
        }
    }
}

/// Conductor del ciclo de refresco (componente H).
pub struct RefreshConductor<R, P, V>
where
    R: RegistrySource,
    P: PopulationGateway,
    V: VmtGateway,
{
    station_repository: StationRepository,
    aggregate_repository: AggregateRepository,
    reference_cache: ReferenceCacheRepository,
    change_log: ChangeLogRepository,
    coordination: CoordinationRepository,
    promotion_authority: PromotionAuthority,
    demographics_oracle: DemographicsOracle<P>,
    registry_source: R,
    vmt_gateway: V,
    county_topology: Arc<CountyTopology>,
    zip_county_index: Arc<ZipCountyIndex>,
}

impl<R, P, V> RefreshConductor<R, P, V>
where
    R: RegistrySource,
    P: PopulationGateway,
    V: VmtGateway,
{
    /// Ensambla el conductor con sus dependencias explícitas: un
    /// cliente del Motor A, los tres gateways y las tablas geográficas.
    #[must_use]
    pub fn assemble(
        database_client: TursoClient,
        registry_source: R,
        population_gateway: P,
        vmt_gateway: V,
        county_topology: Arc<CountyTopology>,
        zip_county_index: Arc<ZipCountyIndex>,
    ) -> Self {
        Self {
            station_repository: StationRepository::new(database_client.clone()),
            aggregate_repository: AggregateRepository::new(database_client.clone()),
            reference_cache: ReferenceCacheRepository::new(database_client.clone()),
            change_log: ChangeLogRepository::new(database_client.clone()),
            coordination: CoordinationRepository::new(database_client.clone()),
            promotion_authority: PromotionAuthority::new(database_client.clone()),
            demographics_oracle: DemographicsOracle::new(
                ReferenceCacheRepository::new(database_client),
                population_gateway,
            ),
            registry_source,
            vmt_gateway,
            county_topology,
            zip_county_index,
        }
    }

    /// Ejecuta un tick del conductor: ciclo fresco, reanudación de un
    /// ciclo parcial, o rechazo por ciclo en curso.
    #[instrument(skip(self, budget))]
    pub async fn execute_cycle(&self, budget: &CycleBudget) -> Result<CycleReport, CycleFault> {
        let candidate_cycle_id = Uuid::new_v4().to_string();

        match self
            .coordination
            .acquire_lock(&candidate_cycle_id, Utc::now())
            .await
            .map_err(storage_fault)?
        {
            LockAcquisition::Acquired => {
                // Un checkpoint huérfano bajo candado libre es residuo de
                // un aborto; se descarta y el ciclo arranca limpio.
                if let Some(stale) = self.coordination.load_checkpoint().await.map_err(storage_fault)? {
                    warn!(
                        "🧹 [CONDUCTOR]: Discarding orphaned checkpoint of cycle [{}] at {}.",
                        stale.cycle_id,
                        stale.phase.as_label()
                    );
                    self.coordination.clear_checkpoint().await.map_err(storage_fault)?;
                }

                let verdict = self.drive_fresh_cycle(&candidate_cycle_id, budget).await;
                self.settle_cycle_state(&candidate_cycle_id, &verdict).await;
                verdict
            }
            LockAcquisition::HeldBy(holder_cycle_id) => {
                let checkpoint = self.coordination.load_checkpoint().await.map_err(storage_fault)?;
                match checkpoint {
                    Some(resumable)
                        if resumable.cycle_id == holder_cycle_id
                            && resumable.phase.is_resumable() =>
                    {
                        info!(
                            "🔁 [CONDUCTOR]: Re-entering cycle [{}] at phase {}.",
                            resumable.cycle_id,
                            resumable.phase.as_label()
                        );
                        let cycle_id = resumable.cycle_id.clone();
                        let verdict = self.resume_cycle(resumable, budget).await;
                        self.settle_cycle_state(&cycle_id, &verdict).await;
                        verdict
                    }
                    _ => Err(CycleFault::CycleInProgress),
                }
            }
        }
    }

    /// Limpieza posterior al tick: desenlaces reanudables conservan
    /// candado y checkpoint; todo lo demás regresa a Idle.
    async fn settle_cycle_state(
        &self,
        cycle_id: &str,
        verdict: &Result<CycleReport, CycleFault>,
    ) {
        let stays_resumable = match verdict {
            Ok(report) => report.outcome == CycleOutcome::Partial,
            Err(CycleFault::PromotionFailed(_)) | Err(CycleFault::PartialCompletion { .. }) => true,
            Err(_) => false,
        };

        if stays_resumable {
            return;
        }

        if let Err(cleanup_fault) = self.coordination.clear_checkpoint().await {
            error!("🧯 [CONDUCTOR]: Checkpoint cleanup failed: {}", cleanup_fault);
        }
        if let Err(cleanup_fault) = self.coordination.release_lock(cycle_id).await {
            error!("🧯 [CONDUCTOR]: Lock release failed: {}", cleanup_fault);
        }
    }

    /// Ciclo fresco: Ingesting -> Detecting -> Aggregating -> conveyor.
    async fn drive_fresh_cycle(
        &self,
        cycle_id: &str,
        budget: &CycleBudget,
    ) -> Result<CycleReport, CycleFault> {
        info!("🛰️ [CONDUCTOR]: Cycle [{}] ignition.", cycle_id);

        // Cosecha VMT de mejor esfuerzo: su fallo deja la cosecha
        // anterior intacta y jamás aborta el ciclo.
        match self.vmt_gateway.fetch_county_vmt().await {
            Ok(vmt_records) => {
                if let Err(vmt_fault) = self
                    .reference_cache
                    .replace_vmt_wholesale(&vmt_records, Utc::now())
                    .await
                {
                    warn!("🚗 [CONDUCTOR]: VMT wholesale replace failed: {}", vmt_fault);
                }
            }
            Err(vmt_fault) => {
                warn!("🚗 [CONDUCTOR]: VMT harvest skipped: {}", vmt_fault);
            }
        }

        // --- FASE: INGESTING ---
        self.persist_phase(cycle_id, CyclePhase::Ingesting, &ChangeManifest::default(), &BTreeSet::new(), 0, 0, 0, 0)
            .await?;

        let ingestion_service =
            RegistryIngestionService::new(&self.registry_source, &self.station_repository);
        let ingestion = ingestion_service.ingest().await?;

        if ingestion.inserted == 0 {
            return Err(CycleFault::UpstreamError(
                "registry produced an empty census".to_string(),
            ));
        }

        let serving_count = self
            .station_repository
            .count(StationStratum::Serving)
            .await
            .map_err(storage_fault)?;
        if serving_count > 0 && u64::from(ingestion.inserted) * 2 <= serving_count {
            return Err(CycleFault::InvariantViolation(format!(
                "staging census ({}) does not exceed half of serving census ({}); upstream truncation suspected",
                ingestion.inserted, serving_count
            )));
        }

        // Resincronía de los estratos staging de agregados: el swap de
        // promoción los dejó una generación atrás.
        self.aggregate_repository
            .resync_staging_from_serving()
            .await
            .map_err(storage_fault)?;

        // --- FASE: DETECTING ---
        self.persist_phase(cycle_id, CyclePhase::Detecting, &ChangeManifest::default(), &BTreeSet::new(), ingestion.inserted, ingestion.rejected, 0, 0)
            .await?;

        let sentinel = ChangeSentinelService::new(
            &self.station_repository,
            &self.aggregate_repository,
            &self.county_topology,
            &self.zip_county_index,
        );
        let manifest = sentinel.detect(cycle_id).await?;

        if manifest.is_empty() {
            if let Err(audit_fault) = self.change_log.append_cycle_record(&manifest, "no_changes").await {
                warn!("🧾 [CONDUCTOR]: Change log append failed: {}", audit_fault);
            }
            info!("💤 [CONDUCTOR]: Cycle [{}] short-circuits: no changes.", cycle_id);
            return Ok(CycleReport::no_changes(
                cycle_id.to_string(),
                ingestion.inserted,
                ingestion.rejected,
            ));
        }

        // --- FASE: AGGREGATING (STATES) ---
        self.persist_phase(cycle_id, CyclePhase::AggregatingStates, &manifest, &manifest.affected_zips, ingestion.inserted, ingestion.rejected, 0, 0)
            .await?;

        let forge = AggregationForgeService::new(
            &self.station_repository,
            &self.aggregate_repository,
            &self.demographics_oracle,
            &self.county_topology,
        );
        let state_rows = forge.forge_states(&manifest).await?;

        // --- FASE: AGGREGATING (COUNTIES) ---
        self.persist_phase(cycle_id, CyclePhase::AggregatingCounties, &manifest, &manifest.affected_zips, ingestion.inserted, ingestion.rejected, state_rows, 0)
            .await?;

        let county_rows = forge.forge_counties(&manifest).await?;

        // --- FASE: AGGREGATING (ZIPS) ---
        let residual_zips = manifest.affected_zips.clone();
        self.persist_phase(cycle_id, CyclePhase::AggregatingZips, &manifest, &residual_zips, ingestion.inserted, ingestion.rejected, state_rows, county_rows)
            .await?;

        self.finish_zip_phase_and_promote(
            cycle_id,
            &manifest,
            residual_zips,
            ingestion.inserted,
            ingestion.rejected,
            state_rows,
            county_rows,
            budget,
        )
        .await
    }

    /// Reanudación desde el checkpoint persistido.
    async fn resume_cycle(
        &self,
        checkpoint: CycleCheckpoint,
        budget: &CycleBudget,
    ) -> Result<CycleReport, CycleFault> {
        match checkpoint.phase {
            CyclePhase::AggregatingZips => {
                self.finish_zip_phase_and_promote(
                    &checkpoint.cycle_id,
                    &checkpoint.manifest,
                    checkpoint.residual_zips.clone(),
                    checkpoint.inserted,
                    checkpoint.rejected,
                    checkpoint.state_rows,
                    checkpoint.county_rows,
                    budget,
                )
                .await
            }
            CyclePhase::Promotable => {
                self.attempt_promotion(
                    &checkpoint.cycle_id,
                    &checkpoint.manifest,
                    checkpoint.inserted,
                    checkpoint.rejected,
                    checkpoint.state_rows,
                    checkpoint.county_rows,
                    0,
                )
                .await
            }
            unexpected_phase => {
                error!(
                    "🧯 [CONDUCTOR]: Non-resumable phase [{}] reached resume path.",
                    unexpected_phase.as_label()
                );
                Err(CycleFault::CycleInProgress)
            }
        }
    }

    /// Conveyor ZIP + puerta de promoción.
    #[allow(clippy::too_many_arguments)]
    async fn finish_zip_phase_and_promote(
        &self,
        cycle_id: &str,
        manifest: &ChangeManifest,
        residual_zips: BTreeSet<ZipKey>,
        inserted: u32,
        rejected: u32,
        state_rows: u32,
        county_rows: u32,
        budget: &CycleBudget,
    ) -> Result<CycleReport, CycleFault> {
        let conveyor = ZipConveyorService::new(
            &self.station_repository,
            &self.aggregate_repository,
            &self.demographics_oracle,
            &self.zip_county_index,
        );

        let affected_total = manifest.affected_zips.len();
        let verdict = conveyor
            .convey(&residual_zips, affected_total, &budget.zip_budget)
            .await?;

        match verdict {
            ConveyorVerdict::Complete { zip_rows } => {
                // PUERTA DE PROMOCIÓN: conveyor completo y estratos de
                // estado y condado no vacíos.
                if state_rows == 0 || county_rows == 0 {
                    return Err(CycleFault::InvariantViolation(format!(
                        "promotion gate refused: state_rows={state_rows}, county_rows={county_rows}"
                    )));
                }

                self.persist_phase(cycle_id, CyclePhase::Promotable, manifest, &BTreeSet::new(), inserted, rejected, state_rows, county_rows)
                    .await?;

                self.attempt_promotion(cycle_id, manifest, inserted, rejected, state_rows, county_rows, zip_rows)
                    .await
            }
            ConveyorVerdict::BudgetExhausted { completion, zip_rows, remaining } => {
                self.persist_phase(cycle_id, CyclePhase::AggregatingZips, manifest, &remaining, inserted, rejected, state_rows, county_rows)
                    .await?;

                info!(
                    "⏸️ [CONDUCTOR]: Cycle [{}] yields at AggregatingZips with completion {:.3}.",
                    cycle_id, completion
                );

                Ok(CycleReport {
                    cycle_id: cycle_id.to_string(),
                    outcome: CycleOutcome::Partial,
                    message: format!("zip sub-pipeline yielded at {completion:.3} completion"),
                    inserted,
                    rejected,
                    state_rows,
                    county_rows,
                    zip_rows,
                    completion: Some(completion),
                    detected: Some(manifest.totals),
                })
            }
            ConveyorVerdict::ChunkFailures { completion, remaining, .. } => {
                self.persist_phase(cycle_id, CyclePhase::AggregatingZips, manifest, &remaining, inserted, rejected, state_rows, county_rows)
                    .await?;

                Err(CycleFault::PartialCompletion { completion })
            }
        }
    }

    /// Promotable -> Promoting -> Idle; el fallo del renombrado deja el
    /// ciclo en Promotable y el próximo tick reintenta.
    #[allow(clippy::too_many_arguments)]
    async fn attempt_promotion(
        &self,
        cycle_id: &str,
        manifest: &ChangeManifest,
        inserted: u32,
        rejected: u32,
        state_rows: u32,
        county_rows: u32,
        zip_rows: u32,
    ) -> Result<CycleReport, CycleFault> {
        match self.promotion_authority.promote().await {
            Ok(()) => {
                if let Err(audit_fault) =
                    self.change_log.append_cycle_record(manifest, "promoted").await
                {
                    // La promoción ya es un hecho; el fallo de bitácora
                    // se reporta pero no revierte el ciclo.
                    warn!("🧾 [CONDUCTOR]: Change log append failed: {}", audit_fault);
                }

                info!("🏁 [CONDUCTOR]: Cycle [{}] promoted to serving.", cycle_id);
                Ok(CycleReport {
                    cycle_id: cycle_id.to_string(),
                    outcome: CycleOutcome::Promoted,
                    message: "staging promoted to serving".to_string(),
                    inserted,
                    rejected,
                    state_rows,
                    county_rows,
                    zip_rows,
                    completion: None,
                    detected: Some(manifest.totals),
                })
            }
            Err(promotion_fault) => {
                error!(
                    "❌ [CONDUCTOR]: Promotion collapsed for cycle [{}]: {}",
                    cycle_id, promotion_fault
                );
                Err(CycleFault::PromotionFailed(promotion_fault.to_string()))
            }
        }
    }

    /// Cristaliza la transición de fase en el checkpoint.
    #[allow(clippy::too_many_arguments)]
    async fn persist_phase(
        &self,
        cycle_id: &str,
        phase: CyclePhase,
        manifest: &ChangeManifest,
        residual_zips: &BTreeSet<ZipKey>,
        inserted: u32,
        rejected: u32,
        state_rows: u32,
        county_rows: u32,
    ) -> Result<(), CycleFault> {
        let checkpoint = CycleCheckpoint {
            cycle_id: cycle_id.to_string(),
            phase,
            manifest: manifest.clone(),
            residual_zips: residual_zips.clone(),
            inserted,
            rejected,
            state_rows,
            county_rows,
        };

        self.coordination
            .save_checkpoint(&checkpoint, Utc::now())
            .await
            .map_err(storage_fault)
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/refresh_conductor.rs]
