// [tests/mirror/libs/infra/db_turso/schema_evolution.test.rs]
/**
 * =================================================================
 * APARATO: SCHEMA EVOLUTION CERTIFIER (V3.0 - ATLAS)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-DB
 * RESPONSABILIDAD: IDEMPOTENCIA Y COMPLETITUD DEL ESQUEMA DUAL
 * =================================================================
 */

use voltaic_infra_db::schema::apply_full_atlas_schema;
use voltaic_infra_db::TursoClient;

#[tokio::test]
async fn certify_schema_idempotency_and_dual_strata() {
    println!("\n🏗️ [PROVING_GROUNDS]: Atlas Schema Evolution Audit...");

    // 1. SETUP: In-Memory DB (connect ya aplica el esquema una vez)
    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let conn = client.get_connection().unwrap();

    // 2. EXECUTION: Segunda pasada para certificar IDEMPOTENCIA
    let result = apply_full_atlas_schema(&conn).await;
    assert!(result.is_ok(), "El motor de esquema no es idempotente");

    // 3. VALIDATION: Todo par staging/serving debe existir
    for base_table in ["stations", "state_aggregates", "county_aggregates", "zip_aggregates"] {
        for table in [base_table.to_string(), format!("{base_table}_staging")] {
            let probe = conn
                .query(&format!("SELECT * FROM {table} LIMIT 0"), ())
                .await;
            assert!(probe.is_ok(), "Tabla {table} no materializada");
        }
    }

    // 4. VALIDATION: Tablas auxiliares del ciclo
    for table in ["population_cache", "vmt_cache", "change_log", "cycle_coordination", "cycle_checkpoint"] {
        let probe = conn
            .query(&format!("SELECT * FROM {table} LIMIT 0"), ())
            .await;
        assert!(probe.is_ok(), "Tabla auxiliar {table} no materializada");
    }

    println!("✅ SCHEMA: Dual strata and idempotency certified.");
}
