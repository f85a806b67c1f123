// INICIO DEL ARCHIVO [apps/orchestrator/src/services/aggregation_forge.rs]
/*!
 * =================================================================
 * APARATO: AGGREGATION FORGE SERVICE (V4.5 - COMPONENT E)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1-APP)
 * RESPONSABILIDAD: FORJA DE AGREGADOS DE ESTADO Y CONDADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. STATE PASS: Una pasada completa sobre staging agrupada por
 *    estado; el group-by es barato y regenera todas las filas.
 * 2. COUNTY FAN-OUT: Los censos condales se forjan en paralelo con
 *    Rayon sobre el prefiltro bbox + 0.05° refinado por polígono.
 * 3. ZIP DELEGATION: La resolución ZIP pertenece al conveyor (G);
 *    esta forja jamás la toca.
 * =================================================================
 */

use crate::services::demographics::DemographicsOracle;
use crate::services::storage_fault;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, instrument};
use voltaic_core_scoring::{need_score, readiness_score};
use voltaic_domain_models::{
    CanonicalStation, ChangeManifest, CycleFault, RegionAggregate, RegionKind, ZoomRange,
};
use voltaic_domain_refinement::{group_by_state, tally_stations, RegionTally};
use voltaic_core_geospatial::{state_name_for_postal, CountyShape, CountyTopology};
use voltaic_infra_db::repositories::{AggregateRepository, StationRepository};
use voltaic_infra_uplink::PopulationGateway;

/// Margen del prefiltro de candidatas alrededor del bbox condal.
pub const COUNTY_BBOX_BUFFER_DEGREES: f64 = 0.05;

/// Forja de agregados de estado y condado (componente E).
pub struct AggregationForgeService<'a, P: PopulationGateway> {
    station_repository: &'a StationRepository,
    aggregate_repository: &'a AggregateRepository,
    demographics_oracle: &'a DemographicsOracle<P>,
    county_topology: &'a CountyTopology,
}

impl<'a, P: PopulationGateway> AggregationForgeService<'a, P> {
    #[must_use]
    pub fn new(
        station_repository: &'a StationRepository,
        aggregate_repository: &'a AggregateRepository,
        demographics_oracle: &'a DemographicsOracle<P>,
        county_topology: &'a CountyTopology,
    ) -> Self {
        Self {
            station_repository,
            aggregate_repository,
            demographics_oracle,
            county_topology,
        }
    }

    /// Pasada estatal completa: siempre regenera todas las filas de
    /// los estados presentes en staging. Un estado afectado que quedó
    /// sin estaciones pierde su fila: ausencia = cero cargadores.
    #[instrument(skip(self, manifest))]
    pub async fn forge_states(&self, manifest: &ChangeManifest) -> Result<u32, CycleFault> {
        info!("🏛️ [FORGE]: Initiating full state aggregation pass...");

        let staging_census = self
            .station_repository
            .staging_all()
            .await
            .map_err(storage_fault)?;

        let state_groups = group_by_state(&staging_census);

        for affected_state in &manifest.affected_states {
            if !state_groups.contains_key(affected_state) {
                self.aggregate_repository
                    .delete_staging_state_row(affected_state)
                    .await
                    .map_err(storage_fault)?;
            }
        }

        let mut forged_rows = Vec::with_capacity(state_groups.len());

        for (state_code, members) in state_groups {
            let tally = tally_stations(members.iter().copied());
            let population = self
                .demographics_oracle
                .population_for_state(&state_code)
                .await?;

            let display_name = population
                .display_name
                .clone()
                .or_else(|| state_name_for_postal(&state_code).map(str::to_string))
                .unwrap_or_else(|| state_code.clone());

            forged_rows.push(forge_row(
                RegionKind::State,
                state_code,
                display_name,
                None,
                None,
                &tally,
                population.value,
                population.is_estimate(),
                None,
            ));
        }

        let written = self
            .aggregate_repository
            .replace_state_rows(&forged_rows)
            .await
            .map_err(forge_sink_fault)?;

        info!("✅ [FORGE]: {} state rows crystallized.", written);
        Ok(written as u32)
    }

    /// Pasada condal: regenera los condados del manifiesto, o todos
    /// los de la topología cuando el manifiesto no acota ninguno.
    #[instrument(skip(self, manifest))]
    pub async fn forge_counties(&self, manifest: &ChangeManifest) -> Result<u32, CycleFault> {
        let targeted_shapes: Vec<&CountyShape> = if manifest.affected_counties.is_empty() {
            self.county_topology.counties().iter().collect()
        } else {
            self.county_topology
                .counties()
                .iter()
                .filter(|shape| {
                    manifest
                        .affected_counties
                        .iter()
                        .any(|key| key.county_fips == shape.county_fips)
                })
                .collect()
        };

        info!(
            "🗺️ [FORGE]: County pass over {} shapes (manifest names {}).",
            targeted_shapes.len(),
            manifest.affected_counties.len()
        );

        let staging_census = self
            .station_repository
            .staging_all()
            .await
            .map_err(storage_fault)?;

        let mut stations_by_state: HashMap<&str, Vec<&CanonicalStation>> = HashMap::new();
        for station in &staging_census {
            stations_by_state
                .entry(station.state.as_str())
                .or_default()
                .push(station);
        }

        // FAN-OUT RAYON: el censo condal (bbox + polígono) es CPU puro;
        // las poblaciones se resuelven después, secuencialmente, sobre
        // la caché del oráculo.
        let county_tallies: Vec<(&CountyShape, RegionTally)> = targeted_shapes
            .par_iter()
            .map(|&shape| {
                let tally = Self::tally_county(shape, &stations_by_state);
                (shape, tally)
            })
            .collect();

        let mut forged_rows = Vec::with_capacity(county_tallies.len());
        for (shape, tally) in county_tallies {
            let population = self
                .demographics_oracle
                .population_for_county(&shape.county_fips)
                .await?;
            let vmt_per_capita = self
                .demographics_oracle
                .county_vmt_per_capita(&shape.county_fips)
                .await?;

            // Un condado afectado sin estaciones conserva una fila en
            // cero; su centro es el del bbox del polígono.
            let mut county_row = forge_row(
                RegionKind::County,
                shape.state.clone(),
                shape.name.clone(),
                Some(shape.county_fips.clone()),
                None,
                &tally,
                population.value,
                population.is_estimate(),
                vmt_per_capita,
            );
            if tally.centroid().is_none() {
                if let Some(county_box) = shape.bounding_box() {
                    county_row.center_latitude =
                        (county_box.min_latitude + county_box.max_latitude) / 2.0;
                    county_row.center_longitude =
                        (county_box.min_longitude + county_box.max_longitude) / 2.0;
                }
            }
            forged_rows.push(county_row);
        }

        let written = self
            .aggregate_repository
            .replace_county_rows(&forged_rows)
            .await
            .map_err(forge_sink_fault)?;

        info!("✅ [FORGE]: {} county rows crystallized.", written);
        Ok(written as u32)
    }

    /// Censo de un condado: candidatas del estado dentro del bbox
    /// expandido, refinadas por punto-en-polígono cuando hay anillos.
    fn tally_county(
        shape: &CountyShape,
        stations_by_state: &HashMap<&str, Vec<&CanonicalStation>>,
    ) -> RegionTally {
        let Some(county_box) = shape.bounding_box() else {
            return RegionTally::default();
        };
        let buffered_box = county_box.expanded(COUNTY_BBOX_BUFFER_DEGREES);

        let state_stations = stations_by_state
            .get(shape.state.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let members = state_stations.iter().copied().filter(|station| {
            if !buffered_box.contains(station.latitude, station.longitude) {
                return false;
            }
            // Refinado por polígono; sin anillos, el bbox decide.
            if shape.rings.is_empty() {
                true
            } else {
                shape.contains(station.latitude, station.longitude)
            }
        });

        tally_stations(members)
    }
}

/// Construye la fila de agregado de una región ya censada. Compartida
/// con el conveyor ZIP para que las tres resoluciones puntúen igual.
#[allow(clippy::too_many_arguments)]
pub(crate) fn forge_row(
    kind: RegionKind,
    state_code: String,
    display_name: String,
    county_fips: Option<String>,
    zip_code: Option<String>,
    tally: &RegionTally,
    population: u64,
    population_is_estimated: bool,
    vmt_per_capita: Option<f64>,
) -> RegionAggregate {
    let (center_latitude, center_longitude) = tally.centroid().unwrap_or((0.0, 0.0));

    RegionAggregate {
        kind,
        state: state_code,
        name: display_name,
        county_fips,
        zip: zip_code,
        center_latitude,
        center_longitude,
        population,
        population_is_estimated,
        chargers: tally.chargers,
        connectors: tally.connectors,
        ports: tally.ports,
        need_score: need_score(tally.chargers.total, population),
        ev_infrastructure_score: readiness_score(
            tally.weighted_mass(),
            population,
            vmt_per_capita,
            false,
        ),
        vmt_per_capita,
        zoom_range: ZoomRange::for_kind(kind),
    }
}

/// Un rechazo de integridad del sumidero es una violación de
/// invariante del ciclo; cualquier otro fallo es de almacenamiento.
pub(crate) fn forge_sink_fault(fault: voltaic_infra_db::DbError) -> CycleFault {
    match fault {
        voltaic_infra_db::DbError::IntegrityViolation(detail) => {
            CycleFault::InvariantViolation(detail)
        }
        other => storage_fault(other),
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/services/aggregation_forge.rs]
