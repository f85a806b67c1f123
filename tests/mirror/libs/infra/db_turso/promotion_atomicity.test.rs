// [tests/mirror/libs/infra/db_turso/promotion_atomicity.test.rs]
/**
 * =================================================================
 * APARATO: PROMOTION ATOMICITY CERTIFIER (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-DB
 * RESPONSABILIDAD: SWAP ATÓMICO DE LOS CUATRO PARES DE TABLAS
 * =================================================================
 */

use chrono::{TimeZone, Utc};
use voltaic_domain_models::{CanonicalStation, ChargerLevel, ConnectorType};
use voltaic_infra_db::repositories::{StationRepository, StationStratum};
use voltaic_infra_db::{PromotionAuthority, TursoClient};

fn forge_station(external_id: i64) -> CanonicalStation {
    CanonicalStation {
        external_id,
        name: format!("Station {external_id}"),
        latitude: 37.75,
        longitude: -122.41,
        street_address: None,
        city: None,
        state: "CA".to_string(),
        zip: Some("94110".to_string()),
        level: ChargerLevel::Level2,
        num_ports: 2,
        connectors: vec![ConnectorType::J1772],
        network: None,
        created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
    }
}

/**
 * CERTIFICACIÓN: El swap mueve staging a serving y recicla el censo
 * anterior como staging del próximo ciclo. Dos promociones seguidas
 * intercambian los estratos dos veces (ida y vuelta).
 */
#[tokio::test]
async fn certify_atomic_swap_roundtrip() {
    println!("\n👑 [PROVING_GROUNDS]: Promotion Atomicity Audit...");

    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let repository = StationRepository::new(client.clone());
    let authority = PromotionAuthority::new(client.clone());

    // Censo fresco en staging; serving vacío (cold start).
    repository
        .insert_staging_burst(&[forge_station(1), forge_station(2)])
        .await
        .unwrap();
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 0);

    // PRIMERA PROMOCIÓN: staging pasa a atender consultas.
    authority.promote().await.unwrap();
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 2);
    assert_eq!(repository.count(StationStratum::Staging).await.unwrap(), 0);

    // SEGUNDO CICLO: censo reducido en staging.
    repository.truncate_staging().await.unwrap();
    repository.insert_staging_burst(&[forge_station(2)]).await.unwrap();

    authority.promote().await.unwrap();
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 1);
    // El censo anterior quedó reciclado como staging.
    assert_eq!(repository.count(StationStratum::Staging).await.unwrap(), 2);

    println!("✅ PROMOTION: Double swap certified with zero row leakage.");
}

/**
 * CERTIFICACIÓN: Un colapso a mitad del swap no deja renombrados
 * parciales. Se sabotea el par zip_aggregates eliminando su staging:
 * la transacción debe revertir y serving debe permanecer intacto.
 */
#[tokio::test]
async fn certify_failed_swap_leaves_serving_untouched() {
    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let repository = StationRepository::new(client.clone());
    let authority = PromotionAuthority::new(client.clone());

    repository.insert_staging_burst(&[forge_station(1)]).await.unwrap();
    authority.promote().await.unwrap();
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 1);

    // SABOTAJE: el par zip queda sin tabla staging.
    let connection = client.get_connection().unwrap();
    connection
        .execute("DROP TABLE zip_aggregates_staging", ())
        .await
        .unwrap();

    let verdict = authority.promote().await;
    assert!(verdict.is_err(), "swap with a missing pair must collapse");

    // Serving intacto: la transacción revirtió los renombrados previos.
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 1);
    assert!(connection.query("SELECT * FROM stations LIMIT 0", ()).await.is_ok());
    assert!(connection.query("SELECT * FROM stations_staging LIMIT 0", ()).await.is_ok());
}
