// [libs/infra/db-turso/src/schema.rs]
/**
 * =================================================================
 * APARATO: ATLAS DATABASE SCHEMA (V3.3 - DUAL STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL STRATA: Cada entidad del atlas vive en un par de tablas
 *    (nombre llano = serving, sufijo _staging = staging) que la
 *    autoridad de promoción intercambia en una sola transacción.
 * 2. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 3. PERFORMANCE: Índices de aceleración para los filtros por estado,
 *    ZIP y caja envolvente.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

/// Cuerpo del par de tablas de estaciones.
const STATION_TABLE_BODY: &str = r#"(
    external_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    street_address TEXT,
    city TEXT,
    state TEXT NOT NULL,
    zip TEXT,
    level TEXT NOT NULL,
    num_ports INTEGER NOT NULL DEFAULT 1,
    connectors_json TEXT NOT NULL DEFAULT '[]',
    network TEXT,
    created_at TEXT NOT NULL
)"#;

/// Columnas compartidas por las tres resoluciones de agregados.
const AGGREGATE_COLUMNS: &str = r#"
    center_latitude REAL NOT NULL,
    center_longitude REAL NOT NULL,
    population INTEGER NOT NULL,
    population_is_estimated INTEGER NOT NULL DEFAULT 0,
    total_chargers INTEGER NOT NULL,
    dcfast_count INTEGER NOT NULL,
    level2_count INTEGER NOT NULL,
    level1_count INTEGER NOT NULL,
    tesla_count INTEGER NOT NULL,
    ccs_count INTEGER NOT NULL,
    j1772_count INTEGER NOT NULL,
    chademo_count INTEGER NOT NULL,
    tesla_ports INTEGER NOT NULL,
    ccs_ports INTEGER NOT NULL,
    j1772_ports INTEGER NOT NULL,
    chademo_ports INTEGER NOT NULL,
    total_ports INTEGER NOT NULL,
    need_score INTEGER NOT NULL,
    ev_infrastructure_score INTEGER NOT NULL,
    vmt_per_capita REAL,
    zoom_range TEXT NOT NULL
"#;

/// Pares de tablas (serving + staging) generados desde un cuerpo común.
fn table_pair_statements() -> Vec<(String, String)> {
    let state_body = format!(
        "(\n    state_code TEXT PRIMARY KEY,\n    region_name TEXT NOT NULL,\n{AGGREGATE_COLUMNS})"
    );
    let county_body = format!(
        "(\n    county_fips TEXT PRIMARY KEY,\n    state_code TEXT NOT NULL,\n    region_name TEXT NOT NULL,\n{AGGREGATE_COLUMNS})"
    );
    let zip_body = format!(
        "(\n    zip_code TEXT NOT NULL,\n    state_code TEXT NOT NULL,\n    region_name TEXT NOT NULL,\n{AGGREGATE_COLUMNS},\n    PRIMARY KEY (zip_code, state_code))"
    );

    let pairs: [(&str, String); 4] = [
        ("stations", STATION_TABLE_BODY.to_string()),
        ("state_aggregates", state_body),
        ("county_aggregates", county_body),
        ("zip_aggregates", zip_body),
    ];

    let mut statements = Vec::new();
    for (base_name, body) in pairs {
        statements.push((
            format!("TABLE_{}", base_name.to_uppercase()),
            format!("CREATE TABLE IF NOT EXISTS {base_name} {body};"),
        ));
        statements.push((
            format!("TABLE_{}_STAGING", base_name.to_uppercase()),
            format!("CREATE TABLE IF NOT EXISTS {base_name}_staging {body};"),
        ));
    }
    statements
}

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Tablas auxiliares del ciclo)
 * Cachés de referencia, bitácora de cambios y coordinación de ciclos.
 */
const AUXILIARY_TABLES: &[(&str, &str)] = &[
    ("TABLE_POPULATION_CACHE", r#"
        CREATE TABLE IF NOT EXISTS population_cache (
            region_type TEXT NOT NULL,
            region_code TEXT NOT NULL,
            population INTEGER NOT NULL,
            display_name TEXT,
            fetched_at TEXT NOT NULL,
            PRIMARY KEY (region_type, region_code)
        );
    "#),
    ("TABLE_VMT_CACHE", r#"
        CREATE TABLE IF NOT EXISTS vmt_cache (
            county_fips TEXT PRIMARY KEY,
            annual_vmt REAL NOT NULL,
            harvested_at TEXT NOT NULL
        );
    "#),
    ("TABLE_CHANGE_LOG", r#"
        CREATE TABLE IF NOT EXISTS change_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cycle_id TEXT NOT NULL,
            detected_at TEXT NOT NULL,
            affected_states_json TEXT NOT NULL,
            affected_counties_json TEXT NOT NULL,
            affected_zips_json TEXT NOT NULL,
            totals_json TEXT NOT NULL,
            outcome TEXT NOT NULL
        );
    "#),
    ("TABLE_CYCLE_COORDINATION", r#"
        CREATE TABLE IF NOT EXISTS cycle_coordination (
            lock_name TEXT PRIMARY KEY,
            cycle_id TEXT NOT NULL,
            acquired_at TEXT NOT NULL
        );
    "#),
    ("TABLE_CYCLE_CHECKPOINT", r#"
        CREATE TABLE IF NOT EXISTS cycle_checkpoint (
            checkpoint_key TEXT PRIMARY KEY,
            cycle_id TEXT NOT NULL,
            phase TEXT NOT NULL,
            manifest_json TEXT NOT NULL,
            residual_zips_json TEXT NOT NULL,
            inserted_stations INTEGER NOT NULL DEFAULT 0,
            rejected_records INTEGER NOT NULL DEFAULT 0,
            state_rows INTEGER NOT NULL DEFAULT 0,
            county_rows INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
    "#),
];

/**
 * ESTRATO 2: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza los filtros por estado y ZIP de ambos estratos de estaciones.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_STATIONS_STATE", "CREATE INDEX IF NOT EXISTS idx_stations_state ON stations(state);"),
    ("IDX_STATIONS_ZIP", "CREATE INDEX IF NOT EXISTS idx_stations_zip ON stations(zip);"),
    ("IDX_STATIONS_STAGING_STATE", "CREATE INDEX IF NOT EXISTS idx_stations_staging_state ON stations_staging(state);"),
    ("IDX_STATIONS_STAGING_ZIP", "CREATE INDEX IF NOT EXISTS idx_stations_staging_zip ON stations_staging(zip);"),
    ("IDX_ZIP_AGG_STAGING_STATE", "CREATE INDEX IF NOT EXISTS idx_zip_agg_staging_state ON zip_aggregates_staging(state_code);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema del atlas.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con Turso.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_atlas_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V3.3...");

    solidify_dual_strata(database_connection).await?;
    solidify_auxiliary_strata(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Atlas Ledger V3.3 level and certified.");
    Ok(())
}

async fn solidify_dual_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in table_pair_statements() {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(&sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn solidify_auxiliary_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in AUXILIARY_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}
