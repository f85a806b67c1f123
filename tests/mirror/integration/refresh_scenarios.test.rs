// [tests/mirror/integration/refresh_scenarios.test.rs]
/**
 * =================================================================
 * APARATO: REFRESH CYCLE SCENARIO CERTIFIER (V4.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE // INTEGRACIÓN EXTREMO-A-EXTREMO
 * RESPONSABILIDAD: ESCENARIOS SEMILLA DEL CICLO DE REFRESCO
 *
 * Cadena certificada sobre un Motor A en memoria y gateways dobles:
 * 1. Cold start: dos estaciones -> dos filas por resolución, promoción.
 * 2. No-op: payload idéntico -> corto circuito "no changes".
 * 3. Modificación: conector CCS añadido -> CA y 94110 re-forjados.
 * 4. Remoción: censo truncado rechazado; censo válido promociona con
 *    CA en cero, NV intacto y WA recién aparecido.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use voltaic_core_geospatial::{CountyTopology, ZipCountyIndex};
use voltaic_domain_models::{
    CycleFault, CycleOutcome, RawFuelStationRecord, ZipKey,
};
use voltaic_infra_db::repositories::{
    AggregateRepository, StationRepository, StationStratum,
};
use voltaic_infra_db::TursoClient;
use voltaic_infra_uplink::{
    PopulationFetch, PopulationGateway, RegistrySource, UplinkError, VmtGateway,
};
use voltaic_orchestrator::prelude::*;

// --- DOBLES DETERMINISTAS DEL PROVING GROUNDS ---

#[derive(Clone)]
struct ScriptedRegistry {
    records: Arc<Mutex<Vec<RawFuelStationRecord>>>,
}

impl RegistrySource for ScriptedRegistry {
    async fn fetch_full_registry(&self) -> Result<Vec<RawFuelStationRecord>, UplinkError> {
        Ok(self.records.lock().unwrap().clone())
    }
}

struct ScriptedCensus;

impl PopulationGateway for ScriptedCensus {
    async fn fetch_state_population(&self, _state_fips: &str) -> Result<PopulationFetch, UplinkError> {
        Ok(PopulationFetch { value: 50_000, display_name: None })
    }

    async fn fetch_county_population(&self, _county_fips: &str) -> Result<PopulationFetch, UplinkError> {
        Ok(PopulationFetch { value: 30_000, display_name: None })
    }

    async fn fetch_zip_population_batch(
        &self,
        zip_codes: &[String],
    ) -> Result<HashMap<String, PopulationFetch>, UplinkError> {
        Ok(zip_codes
            .iter()
            .map(|code| (code.clone(), PopulationFetch { value: 20_000, display_name: None }))
            .collect())
    }
}

struct SilentVmt;

impl VmtGateway for SilentVmt {
    async fn fetch_county_vmt(&self) -> Result<Vec<voltaic_domain_models::CountyVmtRecord>, UplinkError> {
        Ok(Vec::new())
    }
}

fn raw_station(
    id: i64,
    state: &str,
    zip: &str,
    latitude: f64,
    longitude: f64,
    connectors: &[&str],
    dc_fast_ports: i64,
) -> RawFuelStationRecord {
    RawFuelStationRecord {
        id,
        station_name: Some(format!("Station {id}")),
        latitude: Some(latitude),
        longitude: Some(longitude),
        street_address: None,
        city: None,
        state: Some(state.to_string()),
        zip: Some(zip.to_string()),
        ev_connector_types: Some(connectors.iter().map(|c| c.to_string()).collect()),
        ev_dc_fast_num: Some(dc_fast_ports),
        ev_level2_evse_num: None,
        ev_level1_evse_num: None,
        ev_network: None,
    }
}

async fn forge_harness(
) -> (
    RefreshConductor<ScriptedRegistry, ScriptedCensus, SilentVmt>,
    Arc<Mutex<Vec<RawFuelStationRecord>>>,
    TursoClient,
) {
    let upstream_feed = Arc::new(Mutex::new(Vec::new()));
    let database_client = TursoClient::connect(":memory:", None).await.unwrap();

    let conductor = RefreshConductor::assemble(
        database_client.clone(),
        ScriptedRegistry { records: upstream_feed.clone() },
        ScriptedCensus,
        SilentVmt,
        Arc::new(CountyTopology::embedded().clone()),
        Arc::new(ZipCountyIndex::embedded().clone()),
    );

    (conductor, upstream_feed, database_client)
}

fn zip_key(zip: &str, state: &str) -> ZipKey {
    ZipKey { zip: zip.to_string(), state: state.to_string() }
}

#[tokio::test]
async fn certify_seed_scenarios_cold_start_noop_modify_remove() {
    println!("\n🌐 [PROVING_GROUNDS]: Refresh Cycle Seed Scenarios...");

    let (conductor, upstream_feed, database_client) = forge_harness().await;
    let stations = StationRepository::new(database_client.clone());
    let aggregates = AggregateRepository::new(database_client.clone());
    let unlimited_budget = CycleBudget::default();

    // =========================================================
    // ESCENARIO 1: COLD START
    // =========================================================
    *upstream_feed.lock().unwrap() = vec![
        raw_station(1, "CA", "94110", 37.75, -122.41, &["TESLA"], 8),
        raw_station(2, "NV", "89109", 36.11, -115.17, &["J1772COMBO"], 4),
    ];

    let report = conductor.execute_cycle(&unlimited_budget).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Promoted);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.state_rows, 2);
    assert_eq!(report.county_rows, 2);
    assert_eq!(report.zip_rows, 2);

    assert_eq!(stations.count(StationStratum::Serving).await.unwrap(), 2);

    let california = aggregates.state_row(false, "CA").await.unwrap().expect("CA row");
    assert_eq!(california.chargers.dcfast, 1);
    assert_eq!(california.connectors.tesla, 1);
    assert!(california.ev_infrastructure_score > 0);

    let mission_zip = aggregates
        .zip_row(false, &zip_key("94110", "CA"))
        .await
        .unwrap()
        .expect("94110 row");
    assert!(mission_zip.ev_infrastructure_score > 0);
    assert_eq!(mission_zip.ports.tesla, 8);

    let san_francisco = aggregates.county_row(false, "06075").await.unwrap().expect("SF row");
    assert_eq!(san_francisco.chargers.total, 1);
    let clark = aggregates.county_row(false, "32003").await.unwrap().expect("Clark row");
    assert_eq!(clark.chargers.total, 1);

    println!("   ✅ Scenario 1 (cold start): Promoted with full strata.");

    // =========================================================
    // ESCENARIO 2: NO-OP (payload idéntico)
    // =========================================================
    let report = conductor.execute_cycle(&unlimited_budget).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::NoChanges);
    assert_eq!(report.message, "no changes");
    assert_eq!(stations.count(StationStratum::Serving).await.unwrap(), 2);

    println!("   ✅ Scenario 2 (no-op): Short-circuit certified.");

    // =========================================================
    // ESCENARIO 3: MODIFICACIÓN (CCS añadido a la estación 1)
    // =========================================================
    *upstream_feed.lock().unwrap() = vec![
        raw_station(1, "CA", "94110", 37.75, -122.41, &["TESLA", "J1772COMBO"], 8),
        raw_station(2, "NV", "89109", 36.11, -115.17, &["J1772COMBO"], 4),
    ];

    let report = conductor.execute_cycle(&unlimited_budget).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Promoted);
    let totals = report.detected.expect("change totals");
    assert_eq!(totals.modified, 1);
    assert_eq!(totals.affected_states, 1);
    assert_eq!(totals.affected_zips, 1);

    let california = aggregates.state_row(false, "CA").await.unwrap().expect("CA row");
    assert_eq!(california.connectors.ccs, 1, "ccs_count must increase by 1");
    assert_eq!(california.connectors.tesla, 1, "tesla_count must stay");

    let mission_zip = aggregates
        .zip_row(false, &zip_key("94110", "CA"))
        .await
        .unwrap()
        .expect("94110 row");
    assert_eq!(mission_zip.connectors.ccs, 1);
    assert_eq!(mission_zip.connectors.tesla, 1);

    // NV quedó fuera del manifiesto y conserva su fila intacta.
    let vegas_zip = aggregates
        .zip_row(false, &zip_key("89109", "NV"))
        .await
        .unwrap()
        .expect("89109 row survives untouched");
    assert_eq!(vegas_zip.connectors.ccs, 1);

    println!("   ✅ Scenario 3 (modification): Targeted re-forge certified.");

    // =========================================================
    // ESCENARIO 4a: CENSO TRUNCADO (|staging| = 0.5 · |serving|)
    // =========================================================
    *upstream_feed.lock().unwrap() = vec![
        raw_station(2, "NV", "89109", 36.11, -115.17, &["J1772COMBO"], 4),
    ];

    let verdict = conductor.execute_cycle(&unlimited_budget).await;
    assert!(
        matches!(verdict, Err(CycleFault::InvariantViolation(_))),
        "truncated census must abort the cycle"
    );
    assert_eq!(
        stations.count(StationStratum::Serving).await.unwrap(),
        2,
        "serving must still hold both stations"
    );

    println!("   ✅ Scenario 4a (truncation shield): Abort certified.");

    // =========================================================
    // ESCENARIO 4b: REMOCIÓN VÁLIDA + ALTA EN WA
    // =========================================================
    *upstream_feed.lock().unwrap() = vec![
        raw_station(2, "NV", "89109", 36.11, -115.17, &["J1772COMBO"], 4),
        raw_station(3, "WA", "98101", 47.60, -122.33, &["CHADEMO"], 2),
    ];

    let report = conductor.execute_cycle(&unlimited_budget).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Promoted);

    // CA en cero: su fila estatal y su ZIP desaparecen del atlas.
    assert!(aggregates.state_row(false, "CA").await.unwrap().is_none());
    assert!(aggregates
        .zip_row(false, &zip_key("94110", "CA"))
        .await
        .unwrap()
        .is_none());

    // NV intacto.
    let nevada = aggregates.state_row(false, "NV").await.unwrap().expect("NV row");
    assert_eq!(nevada.chargers.total, 1);

    // WA aparece.
    let washington = aggregates.state_row(false, "WA").await.unwrap().expect("WA row");
    assert_eq!(washington.chargers.dcfast, 1);
    let king = aggregates.county_row(false, "53033").await.unwrap().expect("King row");
    assert_eq!(king.chargers.total, 1);

    println!("   ✅ Scenario 4b (removal + addition): Swap certified.");
    println!("🏁 [COMPLETE]: Seed scenarios certified end-to-end.\n");
}
