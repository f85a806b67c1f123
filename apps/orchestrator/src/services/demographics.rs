// INICIO DEL ARCHIVO [apps/orchestrator/src/services/demographics.rs]
/*!
 * =================================================================
 * APARATO: DEMOGRAPHICS ORACLE SERVICE (V4.3 - COMPONENT A)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: POBLACIÓN CON CACHÉ TTL, LOTES ZCTA Y RESPALDOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. THREE-TIER TRUTH: cached (TTL 30 días) -> live (escalera de
 *    reintentos) -> estimate (tabla censal 2020 / constante 15 000).
 * 2. POISON SHIELD: Una estimación jamás se escribe en la caché; el
 *    próximo ciclo reintenta el uplink.
 * 3. BOUNDED CONCURRENCY: Los lotes ZCTA vuelan con a lo sumo 10
 *    peticiones en tránsito.
 * =================================================================
 */

use crate::services::storage_fault;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use voltaic_core_geospatial::{fips_for_postal, state_population_2020};
use voltaic_domain_models::{CycleFault, PopulationProvenance, PopulationRecord, ZipKey};
use voltaic_infra_db::repositories::ReferenceCacheRepository;
use voltaic_infra_uplink::{PopulationGateway, ZIP_BATCH_CEILING};

/// Estimación de respaldo para condados y ZIPs sin dato censal.
pub const COUNTY_ZIP_POPULATION_ESTIMATE: u64 = 15_000;

/// Lotes ZCTA simultáneos en tránsito hacia el servicio censal.
const MAX_INFLIGHT_BATCHES: usize = 10;

/// Etiquetas de tipo de región en la caché de población.
const REGION_TYPE_STATE: &str = "state";
const REGION_TYPE_COUNTY: &str = "county";
const REGION_TYPE_ZIP: &str = "zip";

/// Oráculo demográfico: caché de referencia + gateway censal.
pub struct DemographicsOracle<P: PopulationGateway> {
    reference_cache: ReferenceCacheRepository,
    population_gateway: P,
}

impl<P: PopulationGateway> DemographicsOracle<P> {
    #[must_use]
    pub fn new(reference_cache: ReferenceCacheRepository, population_gateway: P) -> Self {
        Self {
            reference_cache,
            population_gateway,
        }
    }

    /// Población de un estado por código postal de dos letras.
    /// Respaldo terminal: la tabla censal 2020 embebida.
    #[instrument(skip(self))]
    pub async fn population_for_state(&self, postal_code: &str) -> Result<PopulationRecord, CycleFault> {
        if let Some(cached) = self
            .reference_cache
            .fresh_population(REGION_TYPE_STATE, postal_code, Utc::now())
            .await
            .map_err(storage_fault)?
        {
            return Ok(PopulationRecord {
                value: cached.value,
                provenance: PopulationProvenance::Cached,
                display_name: cached.display_name,
                fetched_at: Some(cached.fetched_at),
            });
        }

        let Some(state_fips) = fips_for_postal(postal_code) else {
            warn!("🗺️ [DEMOGRAPHICS]: Unknown state postal [{}]; falling to estimate.", postal_code);
            return Ok(self.state_estimate(postal_code));
        };

        match self.population_gateway.fetch_state_population(state_fips).await {
            Ok(live_fetch) => {
                let fetched_at = Utc::now();
                self.reference_cache
                    .upsert_population(
                        REGION_TYPE_STATE,
                        postal_code,
                        live_fetch.value,
                        live_fetch.display_name.clone(),
                        fetched_at,
                    )
                    .await
                    .map_err(storage_fault)?;

                Ok(PopulationRecord {
                    value: live_fetch.value,
                    provenance: PopulationProvenance::Live,
                    display_name: live_fetch.display_name,
                    fetched_at: Some(fetched_at),
                })
            }
            Err(uplink_fault) => {
                warn!(
                    "📉 [DEMOGRAPHICS]: Census uplink exhausted for state [{}]: {}. Using 2020 table.",
                    postal_code, uplink_fault
                );
                Ok(self.state_estimate(postal_code))
            }
        }
    }

    fn state_estimate(&self, postal_code: &str) -> PopulationRecord {
        PopulationRecord {
            value: state_population_2020(postal_code).unwrap_or(COUNTY_ZIP_POPULATION_ESTIMATE),
            provenance: PopulationProvenance::Estimate,
            display_name: None,
            fetched_at: None,
        }
    }

    /// Población de un condado por FIPS de 5 caracteres.
    /// Respaldo terminal: la constante de 15 000 habitantes.
    #[instrument(skip(self))]
    pub async fn population_for_county(&self, county_fips: &str) -> Result<PopulationRecord, CycleFault> {
        if let Some(cached) = self
            .reference_cache
            .fresh_population(REGION_TYPE_COUNTY, county_fips, Utc::now())
            .await
            .map_err(storage_fault)?
        {
            return Ok(PopulationRecord {
                value: cached.value,
                provenance: PopulationProvenance::Cached,
                display_name: cached.display_name,
                fetched_at: Some(cached.fetched_at),
            });
        }

        match self.population_gateway.fetch_county_population(county_fips).await {
            Ok(live_fetch) => {
                let fetched_at = Utc::now();
                self.reference_cache
                    .upsert_population(
                        REGION_TYPE_COUNTY,
                        county_fips,
                        live_fetch.value,
                        live_fetch.display_name.clone(),
                        fetched_at,
                    )
                    .await
                    .map_err(storage_fault)?;

                Ok(PopulationRecord {
                    value: live_fetch.value,
                    provenance: PopulationProvenance::Live,
                    display_name: live_fetch.display_name,
                    fetched_at: Some(fetched_at),
                })
            }
            Err(uplink_fault) => {
                warn!(
                    "📉 [DEMOGRAPHICS]: Census uplink exhausted for county [{}]: {}. Using constant estimate.",
                    county_fips, uplink_fault
                );
                Ok(PopulationRecord {
                    value: COUNTY_ZIP_POPULATION_ESTIMATE,
                    provenance: PopulationProvenance::Estimate,
                    display_name: None,
                    fetched_at: None,
                })
            }
        }
    }

    /// Poblaciones de un conjunto de ZIPs: caché primero, luego lotes
    /// ZCTA de hasta 50 códigos con 10 en tránsito; los códigos que el
    /// censo no reconoce reciben la estimación constante.
    #[instrument(skip(self, zip_keys), fields(zip_count = zip_keys.len()))]
    pub async fn populations_for_zips(
        &self,
        zip_keys: &[ZipKey],
    ) -> Result<HashMap<ZipKey, PopulationRecord>, CycleFault> {
        let mut resolved: HashMap<ZipKey, PopulationRecord> = HashMap::new();
        let mut cache_misses: Vec<ZipKey> = Vec::new();

        for zip_key in zip_keys {
            match self
                .reference_cache
                .fresh_population(REGION_TYPE_ZIP, &zip_key.zip, Utc::now())
                .await
                .map_err(storage_fault)?
            {
                Some(cached) => {
                    resolved.insert(
                        zip_key.clone(),
                        PopulationRecord {
                            value: cached.value,
                            provenance: PopulationProvenance::Cached,
                            display_name: cached.display_name,
                            fetched_at: Some(cached.fetched_at),
                        },
                    );
                }
                None => cache_misses.push(zip_key.clone()),
            }
        }

        if cache_misses.is_empty() {
            return Ok(resolved);
        }

        // Lotes de hasta 50 códigos, a lo sumo 10 en tránsito.
        let miss_batches: Vec<Vec<ZipKey>> = cache_misses
            .chunks(ZIP_BATCH_CEILING)
            .map(<[ZipKey]>::to_vec)
            .collect();

        let batch_verdicts: Vec<_> = stream::iter(miss_batches.into_iter().map(|batch| {
            let gateway = &self.population_gateway;
            async move {
                let zip_codes: Vec<String> =
                    batch.iter().map(|key| key.zip.clone()).collect();
                let verdict = gateway.fetch_zip_population_batch(&zip_codes).await;
                (batch, verdict)
            }
        }))
        .buffer_unordered(MAX_INFLIGHT_BATCHES)
        .collect()
        .await;

        for (batch, verdict) in batch_verdicts {
            match verdict {
                Ok(population_by_code) => {
                    let fetched_at = Utc::now();
                    for zip_key in batch {
                        match population_by_code.get(&zip_key.zip) {
                            Some(live_fetch) => {
                                self.reference_cache
                                    .upsert_population(
                                        REGION_TYPE_ZIP,
                                        &zip_key.zip,
                                        live_fetch.value,
                                        live_fetch.display_name.clone(),
                                        fetched_at,
                                    )
                                    .await
                                    .map_err(storage_fault)?;

                                resolved.insert(
                                    zip_key,
                                    PopulationRecord {
                                        value: live_fetch.value,
                                        provenance: PopulationProvenance::Live,
                                        display_name: live_fetch.display_name.clone(),
                                        fetched_at: Some(fetched_at),
                                    },
                                );
                            }
                            // ZCTA desconocido para el censo: estimación sin
                            // envenenar la caché.
                            None => {
                                resolved.insert(
                                    zip_key,
                                    PopulationRecord {
                                        value: COUNTY_ZIP_POPULATION_ESTIMATE,
                                        provenance: PopulationProvenance::Estimate,
                                        display_name: None,
                                        fetched_at: None,
                                    },
                                );
                            }
                        }
                    }
                }
                Err(uplink_fault) => {
                    warn!(
                        "📉 [DEMOGRAPHICS]: ZCTA batch exhausted ({}). Estimating {} codes.",
                        uplink_fault,
                        batch.len()
                    );
                    for zip_key in batch {
                        resolved.insert(
                            zip_key,
                            PopulationRecord {
                                value: COUNTY_ZIP_POPULATION_ESTIMATE,
                                provenance: PopulationProvenance::Estimate,
                                display_name: None,
                                fetched_at: None,
                            },
                        );
                    }
                }
            }
        }

        debug!("🧮 [DEMOGRAPHICS]: {} zip populations resolved.", resolved.len());
        Ok(resolved)
    }

    /// VMT per cápita diario de un condado: cosecha VMT de la caché
    /// (anual / 365) dividida por la población condal del oráculo.
    /// None cuando la cosecha no conoce el condado.
    #[instrument(skip(self))]
    pub async fn county_vmt_per_capita(&self, county_fips: &str) -> Result<Option<f64>, CycleFault> {
        let Some(annual_vmt) = self
            .reference_cache
            .annual_vmt_for(county_fips)
            .await
            .map_err(storage_fault)?
        else {
            return Ok(None);
        };

        let county_population = self.population_for_county(county_fips).await?;
        if county_population.value == 0 {
            return Ok(None);
        }

        Ok(Some(annual_vmt / 365.0 / county_population.value as f64))
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/demographics.rs]
