// INICIO DEL ARCHIVO [apps/orchestrator/src/services/change_sentinel.rs]
/*!
 * =================================================================
 * APARATO: CHANGE SENTINEL SERVICE (V4.4 - COMPONENT D)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: DETECCIÓN DE CAMBIOS Y CONJUNTOS AFECTADOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL DERIVATION: Los condados afectados se derivan por
 *    punto-en-polígono (autoridad) Y por el índice estático
 *    ZIP->condado; toda divergencia se registra, el polígono gana.
 * 2. ALREADY-CURRENT FILTER: Un ZIP cuyo agregado serving ya refleja
 *    el censo de staging se excluye del manifiesto.
 * 3. FIPS SOVEREIGNTY: Jamás el proxy grosero de prefijo postal.
 * =================================================================
 */

use crate::services::storage_fault;
use chrono::Utc;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};
use voltaic_core_geospatial::{CountyTopology, ZipCountyIndex};
use voltaic_domain_models::{
    CanonicalStation, ChangeManifest, ChangeTotals, CountyKey, CycleFault, ZipKey,
};
use voltaic_domain_refinement::{affected_regions_of, diff_station_sets, tally_stations};
use voltaic_infra_db::repositories::{AggregateRepository, StationRepository, StationStratum};

/// Centinela de cambios (componente D).
pub struct ChangeSentinelService<'a> {
    station_repository: &'a StationRepository,
    aggregate_repository: &'a AggregateRepository,
    county_topology: &'a CountyTopology,
    zip_county_index: &'a ZipCountyIndex,
}

impl<'a> ChangeSentinelService<'a> {
    #[must_use]
    pub fn new(
        station_repository: &'a StationRepository,
        aggregate_repository: &'a AggregateRepository,
        county_topology: &'a CountyTopology,
        zip_county_index: &'a ZipCountyIndex,
    ) -> Self {
        Self {
            station_repository,
            aggregate_repository,
            county_topology,
            zip_county_index,
        }
    }

    /// Ejecuta la detección completa y emite el manifiesto post-filtro.
    #[instrument(skip(self))]
    pub async fn detect(&self, cycle_id: &str) -> Result<ChangeManifest, CycleFault> {
        info!("🔍 [SENTINEL]: Diffing staging census against serving census...");

        let staging_index = self
            .station_repository
            .load_station_index(StationStratum::Staging)
            .await
            .map_err(storage_fault)?;
        let serving_index = self
            .station_repository
            .load_station_index(StationStratum::Serving)
            .await
            .map_err(storage_fault)?;

        let diff = diff_station_sets(&staging_index, &serving_index);
        if diff.is_empty() {
            info!("💤 [SENTINEL]: Census unchanged; cycle will short-circuit.");
            return Ok(ChangeManifest {
                cycle_id: cycle_id.to_string(),
                detected_at: Some(Utc::now()),
                ..ChangeManifest::default()
            });
        }

        let (affected_states, affected_zips) = affected_regions_of(&diff);
        let affected_counties = self.derive_affected_counties(&diff);

        // Filtro de ZIPs ya-actuales: el agregado serving coincide con
        // el censo staging del ZIP -> nada que recomputar.
        let mut filtered_zips = BTreeSet::new();
        for zip_key in affected_zips {
            if self.zip_is_already_current(&zip_key).await? {
                debug!(
                    "⏭️ [SENTINEL]: ZIP [{}/{}] already current; filtered out.",
                    zip_key.state, zip_key.zip
                );
                continue;
            }
            filtered_zips.insert(zip_key);
        }

        let totals = ChangeTotals {
            added: diff.added.len() as u32,
            removed: diff.removed.len() as u32,
            modified: diff.modified.len() as u32,
            affected_states: affected_states.len() as u32,
            affected_counties: affected_counties.len() as u32,
            affected_zips: filtered_zips.len() as u32,
        };

        info!(
            "🧭 [SENTINEL]: {} added / {} removed / {} modified -> {} states, {} counties, {} zips.",
            totals.added, totals.removed, totals.modified,
            totals.affected_states, totals.affected_counties, totals.affected_zips
        );

        Ok(ChangeManifest {
            cycle_id: cycle_id.to_string(),
            detected_at: Some(Utc::now()),
            affected_states,
            affected_counties,
            affected_zips: filtered_zips,
            totals,
        })
    }

    /// Condados afectados por doble derivación FIPS.
    fn derive_affected_counties(
        &self,
        diff: &voltaic_domain_models::StationDiff,
    ) -> BTreeSet<CountyKey> {
        let mut affected_counties = BTreeSet::new();

        let mut absorb_station = |station: &CanonicalStation| {
            let polygon_verdict = self
                .county_topology
                .county_containing(station.latitude, station.longitude)
                .map(|shape| CountyKey {
                    county_fips: shape.county_fips.clone(),
                    state: shape.state.clone(),
                    name: shape.name.clone(),
                });

            let index_verdict = station.zip.as_deref().and_then(|zip| {
                self.zip_county_index.lookup(zip).map(|entry| CountyKey {
                    county_fips: entry.county_fips.clone(),
                    state: entry.state.clone(),
                    name: entry.county_name.clone(),
                })
            });

            // Los dos caminos deben coincidir; la divergencia se
            // registra y el polígono decide.
            match (&polygon_verdict, &index_verdict) {
                (Some(polygon_county), Some(index_county))
                    if polygon_county.county_fips != index_county.county_fips =>
                {
                    warn!(
                        "🧩 [SENTINEL]: County derivation divergence for station [{}]: polygon={} index={}. Polygon wins.",
                        station.external_id, polygon_county.county_fips, index_county.county_fips
                    );
                }
                _ => {}
            }

            if let Some(county_key) = polygon_verdict.or(index_verdict) {
                affected_counties.insert(county_key);
            }
        };

        for station in &diff.added {
            absorb_station(station);
        }
        for station in &diff.removed {
            absorb_station(station);
        }
        for pair in &diff.modified {
            absorb_station(&pair.current);
            absorb_station(&pair.previous);
        }

        affected_counties
    }

    /// Un ZIP está ya-actual cuando su fila serving refleja por completo
    /// el censo del agrupado staging: niveles, clases de conector y
    /// puertos. Comparar sólo niveles dejaría pasar mutaciones de
    /// conector sin recómputo.
    async fn zip_is_already_current(&self, zip_key: &ZipKey) -> Result<bool, CycleFault> {
        let Some(serving_row) = self
            .aggregate_repository
            .zip_row(false, zip_key)
            .await
            .map_err(storage_fault)?
        else {
            return Ok(false);
        };

        let staged_stations = self
            .station_repository
            .staging_for_zip_keys(std::slice::from_ref(zip_key))
            .await
            .map_err(storage_fault)?;

        let staging_tally = tally_stations(&staged_stations);
        Ok(staging_tally.chargers == serving_row.chargers
            && staging_tally.connectors == serving_row.connectors
            && staging_tally.ports == serving_row.ports)
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/change_sentinel.rs]
