// [tests/mirror/libs/infra/db_turso/coordination_lock.test.rs]
/**
 * =================================================================
 * APARATO: COORDINATION LOCK CERTIFIER (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-DB
 * RESPONSABILIDAD: CANDADO DE CICLO ÚNICO Y CHECKPOINT REANUDABLE
 * =================================================================
 */

use chrono::Utc;
use std::collections::BTreeSet;
use voltaic_domain_models::{ChangeManifest, CyclePhase, ZipKey};
use voltaic_infra_db::repositories::{
    CoordinationRepository, CycleCheckpoint, LockAcquisition,
};
use voltaic_infra_db::TursoClient;

/**
 * CERTIFICACIÓN: Exactamente un ciclo gana el candado; la liberación
 * es condicional al identificador del tenedor.
 */
#[tokio::test]
async fn certify_single_cycle_lock() {
    println!("\n🔐 [PROVING_GROUNDS]: Cycle Lock Audit...");

    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let coordination = CoordinationRepository::new(client);
    let now = Utc::now();

    assert_eq!(
        coordination.acquire_lock("cycle-alpha", now).await.unwrap(),
        LockAcquisition::Acquired
    );

    // Un segundo ciclo debe ser rechazado con el tenedor identificado.
    assert_eq!(
        coordination.acquire_lock("cycle-beta", now).await.unwrap(),
        LockAcquisition::HeldBy("cycle-alpha".to_string())
    );

    // Liberación con identificador ajeno: el candado persiste.
    coordination.release_lock("cycle-beta").await.unwrap();
    assert_eq!(
        coordination.acquire_lock("cycle-gamma", now).await.unwrap(),
        LockAcquisition::HeldBy("cycle-alpha".to_string())
    );

    // Liberación legítima: el siguiente ciclo adquiere.
    coordination.release_lock("cycle-alpha").await.unwrap();
    assert_eq!(
        coordination.acquire_lock("cycle-gamma", now).await.unwrap(),
        LockAcquisition::Acquired
    );

    println!("✅ LOCK: Single-cycle guarantee certified.");
}

/**
 * CERTIFICACIÓN: El checkpoint sobrevive el roundtrip completo
 * (fase + manifiesto + ZIPs residuales + contadores).
 */
#[tokio::test]
async fn certify_checkpoint_roundtrip() {
    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let coordination = CoordinationRepository::new(client);
    let now = Utc::now();

    assert!(coordination.load_checkpoint().await.unwrap().is_none());

    let mut manifest = ChangeManifest::default();
    manifest.cycle_id = "cycle-alpha".to_string();
    manifest.affected_states.insert("CA".to_string());

    let mut residual_zips = BTreeSet::new();
    residual_zips.insert(ZipKey { zip: "94110".to_string(), state: "CA".to_string() });
    residual_zips.insert(ZipKey { zip: "94103".to_string(), state: "CA".to_string() });

    let checkpoint = CycleCheckpoint {
        cycle_id: "cycle-alpha".to_string(),
        phase: CyclePhase::AggregatingZips,
        manifest,
        residual_zips,
        inserted: 1200,
        rejected: 7,
        state_rows: 51,
        county_rows: 12,
    };

    coordination.save_checkpoint(&checkpoint, now).await.unwrap();

    let rehydrated = coordination
        .load_checkpoint()
        .await
        .unwrap()
        .expect("checkpoint must persist");
    assert_eq!(rehydrated.cycle_id, "cycle-alpha");
    assert_eq!(rehydrated.phase, CyclePhase::AggregatingZips);
    assert!(rehydrated.phase.is_resumable());
    assert_eq!(rehydrated.residual_zips.len(), 2);
    assert_eq!(rehydrated.inserted, 1200);
    assert!(rehydrated.manifest.affected_states.contains("CA"));

    // El upsert sobre la fila única reemplaza, no duplica.
    let mut advanced = checkpoint;
    advanced.phase = CyclePhase::Promotable;
    advanced.residual_zips = BTreeSet::new();
    coordination.save_checkpoint(&advanced, now).await.unwrap();

    let final_state = coordination.load_checkpoint().await.unwrap().unwrap();
    assert_eq!(final_state.phase, CyclePhase::Promotable);
    assert!(final_state.residual_zips.is_empty());

    coordination.clear_checkpoint().await.unwrap();
    assert!(coordination.load_checkpoint().await.unwrap().is_none());
}
