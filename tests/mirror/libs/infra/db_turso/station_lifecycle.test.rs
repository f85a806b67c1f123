// [tests/mirror/libs/infra/db_turso/station_lifecycle.test.rs]
/**
 * =================================================================
 * APARATO: STATION LIFECYCLE CERTIFIER (V3.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-DB
 * RESPONSABILIDAD: RÁFAGAS DE INSERCIÓN, ÍNDICES Y FILTROS GEO
 * =================================================================
 */

use chrono::{TimeZone, Utc};
use voltaic_core_geospatial::BoundingBox;
use voltaic_domain_models::{CanonicalStation, ChargerLevel, ConnectorType, ZipKey};
use voltaic_infra_db::repositories::{StationRepository, StationStratum};
use voltaic_infra_db::TursoClient;

fn forge_station(external_id: i64, state: &str, zip: &str, latitude: f64, longitude: f64) -> CanonicalStation {
    CanonicalStation {
        external_id,
        name: format!("Station {external_id}"),
        latitude,
        longitude,
        street_address: None,
        city: None,
        state: state.to_string(),
        zip: Some(zip.to_string()),
        level: ChargerLevel::DcFast,
        num_ports: 4,
        connectors: vec![ConnectorType::Tesla, ConnectorType::J1772Combo],
        network: Some("Tesla".to_string()),
        created_at: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn certify_station_roundtrip_and_truncate() {
    println!("\n🔌 [PROVING_GROUNDS]: Station Census Lifecycle Audit...");

    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let repository = StationRepository::new(client);

    let burst = vec![
        forge_station(1, "CA", "94110", 37.75, -122.41),
        forge_station(2, "NV", "89109", 36.11, -115.17),
    ];
    let inserted = repository.insert_staging_burst(&burst).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(repository.count(StationStratum::Staging).await.unwrap(), 2);
    assert_eq!(repository.count(StationStratum::Serving).await.unwrap(), 0);

    // Roundtrip bit-perfecto del censo
    let index = repository
        .load_station_index(StationStratum::Staging)
        .await
        .unwrap();
    assert_eq!(index.len(), 2);
    let mission = index.get(&1).expect("station 1 present");
    assert_eq!(mission.zip.as_deref(), Some("94110"));
    assert_eq!(mission.level, ChargerLevel::DcFast);
    assert_eq!(mission.connectors, vec![ConnectorType::Tesla, ConnectorType::J1772Combo]);

    // El truncado prepara la idempotencia del driver
    repository.truncate_staging().await.unwrap();
    assert_eq!(repository.count(StationStratum::Staging).await.unwrap(), 0);

    println!("✅ LIFECYCLE: Burst, roundtrip and truncate certified.");
}

#[tokio::test]
async fn certify_zip_and_bbox_filters() {
    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let repository = StationRepository::new(client);

    let burst = vec![
        forge_station(1, "CA", "94110", 37.75, -122.41),
        forge_station(2, "NV", "89109", 36.11, -115.17),
        forge_station(3, "CA", "90012", 34.05, -118.24),
    ];
    repository.insert_staging_burst(&burst).await.unwrap();

    // Filtro por lote de claves ZIP (estado incluido en la clave)
    let keys = vec![
        ZipKey { zip: "94110".to_string(), state: "CA".to_string() },
        ZipKey { zip: "89109".to_string(), state: "NV".to_string() },
    ];
    let by_zip = repository.staging_for_zip_keys(&keys).await.unwrap();
    assert_eq!(by_zip.len(), 2);

    // Una clave con estado equivocado no matchea
    let wrong_state = vec![ZipKey { zip: "94110".to_string(), state: "NV".to_string() }];
    assert!(repository.staging_for_zip_keys(&wrong_state).await.unwrap().is_empty());

    // Caja envolvente de la bahía de San Francisco
    let bay_area = BoundingBox {
        min_latitude: 37.0,
        max_latitude: 38.5,
        min_longitude: -123.0,
        max_longitude: -121.5,
    };
    let candidates = repository.staging_in_state_bbox("CA", &bay_area).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].external_id, 1);
}

#[tokio::test]
async fn certify_polygon_containment_rpc() {
    let client = TursoClient::connect(":memory:", None).await.unwrap();
    let repository = StationRepository::new(client);

    repository
        .insert_staging_burst(&[
            forge_station(1, "CA", "94110", 37.75, -122.41),
            forge_station(2, "CA", "94601", 37.78, -122.22),
        ])
        .await
        .unwrap();

    // Polígono de San Francisco (orden GeoJSON [lng, lat])
    let san_francisco = vec![vec![
        [-122.52, 37.70],
        [-122.35, 37.70],
        [-122.35, 37.83],
        [-122.52, 37.83],
    ]];

    let contained = repository.staging_in_polygon(&san_francisco).await.unwrap();
    assert_eq!(contained.len(), 1);
    assert_eq!(contained[0].external_id, 1);
}
