// INICIO DEL ARCHIVO [apps/orchestrator/src/services/ingestion.rs]
/*!
 * =================================================================
 * APARATO: REGISTRY INGESTION SERVICE (V4.2 - COMPONENT C)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: INGESTA DEL CENSO FEDERAL HACIA STAGING
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IDEMPOTENT DRIVE: Staging se trunca antes de la primera ráfaga;
 *    repetir la ingesta produce el mismo censo.
 * 2. BACKPRESSURE: Ráfagas de 1 000 filas con pausa de 100 ms entre
 *    ráfagas para no saturar el Motor A.
 * 3. REJECTION LEDGER: Los rechazos del refinador se cuentan por razón
 *    y jamás abortan; un error de ráfaga sí aborta (upstream-error).
 * =================================================================
 */

use crate::services::{storage_fault, upstream_fault};
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, instrument, warn};
use voltaic_domain_models::{CycleFault, RejectionReason};
use voltaic_domain_refinement::normalize_station;
use voltaic_infra_db::repositories::StationRepository;
use voltaic_infra_uplink::RegistrySource;

/// Tamaño de ráfaga de inserción en staging.
pub const INGESTION_BURST_SIZE: usize = 1_000;

/// Pausa de contrapresión entre ráfagas.
const INTER_BURST_PAUSE: Duration = Duration::from_millis(100);

/// Techo de reloj de cada ráfaga de inserción.
const BURST_INSERT_TIMEOUT: Duration = Duration::from_secs(30);

/// Desenlace de la ingesta: censo cristalizado y rechazos contados.
#[derive(Debug, Clone, Default)]
pub struct IngestionOutcome {
    pub inserted: u32,
    pub rejected: u32,
    pub rejections_by_reason: HashMap<RejectionReason, u32>,
}

/// Driver de ingesta del registro federal (componente C).
pub struct RegistryIngestionService<'a, R: RegistrySource> {
    registry_source: &'a R,
    station_repository: &'a StationRepository,
}

impl<'a, R: RegistrySource> RegistryIngestionService<'a, R> {
    #[must_use]
    pub fn new(registry_source: &'a R, station_repository: &'a StationRepository) -> Self {
        Self {
            registry_source,
            station_repository,
        }
    }

    /// Ejecuta la ingesta completa: fetch, refinado y cristalización.
    #[instrument(skip(self))]
    pub async fn ingest(&self) -> Result<IngestionOutcome, CycleFault> {
        info!("⚙️ [INGESTION]: Initiating federal census ingestion...");

        let raw_records = self
            .registry_source
            .fetch_full_registry()
            .await
            .map_err(upstream_fault)?;

        // Idempotencia: el censo anterior de staging se descarta entero.
        self.station_repository
            .truncate_staging()
            .await
            .map_err(storage_fault)?;

        let observed_at = Utc::now();
        let mut outcome = IngestionOutcome::default();
        let mut burst_buffer = Vec::with_capacity(INGESTION_BURST_SIZE);
        let mut is_first_burst = true;

        for raw_record in &raw_records {
            match normalize_station(raw_record, observed_at) {
                Ok(canonical_station) => burst_buffer.push(canonical_station),
                Err(rejection_reason) => {
                    outcome.rejected += 1;
                    *outcome
                        .rejections_by_reason
                        .entry(rejection_reason)
                        .or_insert(0) += 1;
                }
            }

            if burst_buffer.len() >= INGESTION_BURST_SIZE {
                if !is_first_burst {
                    tokio::time::sleep(INTER_BURST_PAUSE).await;
                }
                is_first_burst = false;

                let written = self.crystallize_burst(&burst_buffer).await?;
                outcome.inserted += written as u32;
                burst_buffer.clear();

                info!(
                    "📦 [INGESTION]: {} stations crystallized so far ({} rejected).",
                    outcome.inserted, outcome.rejected
                );
            }
        }

        // Residuo final; una ráfaga sin supervivientes no es error.
        if !burst_buffer.is_empty() {
            let written = self.crystallize_burst(&burst_buffer).await?;
            outcome.inserted += written as u32;
        }

        if outcome.rejected > 0 {
            warn!(
                "🧾 [INGESTION]: {} records rejected by the refinery: {:?}",
                outcome.rejected, outcome.rejections_by_reason
            );
        }
        info!(
            "✅ [INGESTION]: Census level with {} stations ({} rejected).",
            outcome.inserted, outcome.rejected
        );

        Ok(outcome)
    }

    /// Cristaliza una ráfaga bajo el techo de 30 s; un colapso o un
    /// timeout de ráfaga aborta el ciclo como upstream-error.
    async fn crystallize_burst(
        &self,
        burst_buffer: &[voltaic_domain_models::CanonicalStation],
    ) -> Result<usize, CycleFault> {
        match tokio::time::timeout(
            BURST_INSERT_TIMEOUT,
            self.station_repository.insert_staging_burst(burst_buffer),
        )
        .await
        {
            Ok(burst_verdict) => {
                burst_verdict.map_err(|fault| CycleFault::UpstreamError(fault.to_string()))
            }
            Err(_) => Err(CycleFault::UpstreamError(
                "staging burst exceeded its 30s ceiling".to_string(),
            )),
        }
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/ingestion.rs]
