// [tests/mirror/integration/zip_resume.test.rs]
/**
 * =================================================================
 * APARATO: ZIP CONVEYOR RESUME CERTIFIER (V4.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // INTEGRACIÓN EXTREMO-A-EXTREMO
 * RESPONSABILIDAD: REANUDACIÓN DEL CONVEYOR A TRAVÉS DE TICKS
 *
 * Escenario semilla: 250 ZIPs afectados, chunks de 100, techo del
 * host tras dos chunks. El primer tick cede en partial(200/250) sin
 * promover; el segundo tick reanuda los 50 restantes y promueve; un
 * tercer tick certifica la idempotencia post-promoción.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use voltaic_core_geospatial::{CountyTopology, ZipCountyIndex};
use voltaic_domain_models::{CycleOutcome, CyclePhase, RawFuelStationRecord, ZipKey};
use voltaic_infra_db::repositories::{
    AggregateRepository, CoordinationRepository, StationRepository, StationStratum,
};
use voltaic_infra_db::TursoClient;
use voltaic_infra_uplink::{
    PopulationFetch, PopulationGateway, RegistrySource, UplinkError, VmtGateway,
};
use voltaic_orchestrator::prelude::*;
use voltaic_orchestrator::services::zip_conveyor::ChunkBudget;

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

/// 250 estaciones con ZIPs distintos dentro de San Francisco.
fn forge_dense_census() -> Vec<RawFuelStationRecord> {
    (0..250)
        .map(|index| RawFuelStationRecord {
            id: 1_000 + index,
            station_name: Some(format!("Dense Station {index}")),
            latitude: Some(37.71 + (index % 100) as f64 * 0.001),
            longitude: Some(-122.50 + (index % 100) as f64 * 0.001),
            street_address: None,
            city: None,
            state: Some("CA".to_string()),
            zip: Some(format!("{}", 60_000 + index)),
            ev_connector_types: Some(vec!["J1772".to_string()]),
            ev_dc_fast_num: None,
            ev_level2_evse_num: Some(2),
            ev_level1_evse_num: None,
            ev_network: None,
        })
        .collect()
}

#[tokio::test]
async fn certify_partial_completion_and_resume() {
    println!("\n📮 [PROVING_GROUNDS]: Zip Conveyor Resume Audit (250 zips / ceiling at 2 chunks)...");

    let upstream_feed = Arc::new(Mutex::new(forge_dense_census()));
    let database_client = TursoClient::connect(":memory:", None).await.unwrap();

    let conductor = RefreshConductor::assemble(
        database_client.clone(),
        ScriptedRegistry { records: upstream_feed.clone() },
        ScriptedCensus,
        SilentVmt,
        Arc::new(CountyTopology::embedded().clone()),
        Arc::new(ZipCountyIndex::embedded().clone()),
    );

    let stations = StationRepository::new(database_client.clone());
    let aggregates = AggregateRepository::new(database_client.clone());
    let coordination = CoordinationRepository::new(database_client.clone());

    // --- TICK 1: el techo del host dispara tras dos chunks ---
    let ceiling_budget = CycleBudget {
        zip_budget: ChunkBudget { deadline: None, max_chunks: Some(2) },
    };

    let report = conductor.execute_cycle(&ceiling_budget).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Partial);
    let completion = report.completion.expect("partial carries completion");
    assert!((completion - 0.8).abs() < 1e-9, "expected 200/250, got {completion}");

    // Sin promoción: serving sigue vacío.
    assert_eq!(stations.count(StationStratum::Serving).await.unwrap(), 0);

    // El checkpoint quedó en AggregatingZips con 50 ZIPs residuales.
    let checkpoint = coordination
        .load_checkpoint()
        .await
        .unwrap()
        .expect("resumable checkpoint persisted");
    assert_eq!(checkpoint.phase, CyclePhase::AggregatingZips);
    assert_eq!(checkpoint.residual_zips.len(), 50);
    assert_eq!(checkpoint.manifest.affected_zips.len(), 250);

    // Dos chunks de staging ya cristalizados.
    assert_eq!(aggregates.staging_zip_keys().await.unwrap().len(), 200);

    println!("   ✅ Tick 1: partial(0.800) with 50 residual zips.");

    // --- TICK 2: proceso "reiniciado" (conductor fresco sobre el mismo
    // Motor A); presupuesto pleno; reanuda los ZIPs 201-250 y promueve ---
    let reborn_conductor = RefreshConductor::assemble(
        database_client.clone(),
        ScriptedRegistry { records: upstream_feed.clone() },
        ScriptedCensus,
        SilentVmt,
        Arc::new(CountyTopology::embedded().clone()),
        Arc::new(ZipCountyIndex::embedded().clone()),
    );

    let report = reborn_conductor.execute_cycle(&CycleBudget::default()).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::Promoted);

    assert_eq!(stations.count(StationStratum::Serving).await.unwrap(), 250);
    assert!(coordination.load_checkpoint().await.unwrap().is_none());

    // Espoteo de filas ZIP en serving: primera, frontera del techo y última.
    for probe_zip in ["60000", "60199", "60200", "60249"] {
        let census = aggregates
            .serving_zip_census(&ZipKey { zip: probe_zip.to_string(), state: "CA".to_string() })
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("zip {probe_zip} must be served"));
        assert_eq!(census.total, 1);
        assert_eq!(census.level2, 1);
    }

    println!("   ✅ Tick 2: restart-resume drained residue and promoted 250 zips.");

    // --- TICK 3: idempotencia post-promoción ---
    let report = conductor.execute_cycle(&CycleBudget::default()).await.unwrap();
    assert_eq!(report.outcome, CycleOutcome::NoChanges);
    assert_eq!(stations.count(StationStratum::Serving).await.unwrap(), 250);

    println!("   ✅ Tick 3: completion idempotence certified.");
    println!("🏁 [COMPLETE]: Conveyor resume strata certified.\n");
}
