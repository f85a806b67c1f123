// INICIO DEL ARCHIVO [libs/infra/db-turso/src/repositories/aggregate.rs]
/*!
 * =================================================================
 * APARATO: REGION AGGREGATE REPOSITORY (V3.6 - FORGE SINK)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CRISTALIZACIÓN DE AGREGADOS EN STAGING
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DELETE-THEN-INSERT: Cada reemplazo borra exactamente las filas
 *    que va a reescribir y cristaliza las nuevas en ráfagas de 500
 *    dentro de una transacción.
 * 2. INTEGRITY GATE: Toda fila se certifica (totalidad de niveles,
 *    totalidad de puertos, rango de puntuación) ANTES del INSERT; una
 *    violación aborta el ciclo como invariant-violation.
 * 3. STRATA DISCIPLINE: Sólo staging es escribible; serving se lee
 *    para el filtro de ZIPs ya-actuales del centinela.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use libsql::{params, Row};

/// Inyección de parámetros de una fila de agregado: claves de la
/// resolución seguidas de las 21 columnas de valores compartidas.
macro_rules! aggregate_row_params {
    ($row:expr $(, $key:expr)*) => {
        params![
            $( $key, )*
            $row.center_latitude,
            $row.center_longitude,
            $row.population as i64,
            i64::from($row.population_is_estimated),
            i64::from($row.chargers.total),
            i64::from($row.chargers.dcfast),
            i64::from($row.chargers.level2),
            i64::from($row.chargers.level1),
            i64::from($row.connectors.tesla),
            i64::from($row.connectors.ccs),
            i64::from($row.connectors.j1772),
            i64::from($row.connectors.chademo),
            i64::from($row.ports.tesla),
            i64::from($row.ports.ccs),
            i64::from($row.ports.j1772),
            i64::from($row.ports.chademo),
            i64::from($row.ports.total),
            i64::from($row.need_score),
            i64::from($row.ev_infrastructure_score),
            $row.vmt_per_capita,
            $row.zoom_range.as_label()
        ]
    };
}
use std::collections::BTreeSet;
use tracing::{debug, instrument};
use voltaic_domain_models::{
    ChargerCensus, ConnectorCensus, PortCensus, RegionAggregate, RegionKind, ZipKey, ZoomRange,
};

/// Tamaño de ráfaga de inserción para las tres resoluciones.
pub const AGGREGATE_INSERT_BATCH: usize = 500;

/// Columnas compartidas por las tres resoluciones, en orden de mapeo.
const AGGREGATE_VALUE_COLUMNS: &str = "center_latitude, center_longitude, population, population_is_estimated, \
     total_chargers, dcfast_count, level2_count, level1_count, \
     tesla_count, ccs_count, j1772_count, chademo_count, \
     tesla_ports, ccs_ports, j1772_ports, chademo_ports, total_ports, \
     need_score, ev_infrastructure_score, vmt_per_capita, zoom_range";

/// Repositorio de autoridad única para los agregados multiresolución.
pub struct AggregateRepository {
    database_client: TursoClient,
}

impl AggregateRepository {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Sincroniza los tres estratos staging de agregados desde serving
    /// al inicio del ciclo. El swap de promoción recicla el serving
    /// previo como staging (una generación atrás); sin esta resincronía
    /// una actualización dirigida regresaría las regiones no afectadas.
    #[instrument(skip(self))]
    pub async fn resync_staging_from_serving(&self) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;

        for base_table in ["state_aggregates", "county_aggregates", "zip_aggregates"] {
            let resync_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

            resync_transaction
                .execute(&format!("DELETE FROM {base_table}_staging"), ())
                .await?;
            resync_transaction
                .execute(
                    &format!("INSERT INTO {base_table}_staging SELECT * FROM {base_table}"),
                    (),
                )
                .await?;

            resync_transaction
                .commit()
                .await
                .map_err(|_| DbError::TransactionError)?;
        }

        debug!("🔄 [AGGREGATE_REPO]: Staging strata resynced from serving.");
        Ok(())
    }

    /// Borra la fila estatal de staging de un estado afectado que quedó
    /// sin estaciones; su ausencia tras la promoción es el estado correcto.
    pub async fn delete_staging_state_row(&self, state_code: &str) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "DELETE FROM state_aggregates_staging WHERE state_code = ?1",
                params![state_code],
            )
            .await?;
        Ok(())
    }

    /// Certifica las invariantes de toda la ráfaga antes de tocar el Motor A.
    fn certify_rows(rows: &[RegionAggregate]) -> Result<(), DbError> {
        for row in rows {
            if let Some(violation) = row.integrity_violation() {
                return Err(DbError::IntegrityViolation(violation));
            }
        }
        Ok(())
    }

    /// Reemplaza las filas estatales de staging (borra las reescritas,
    /// inserta en ráfagas de 500).
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn replace_state_rows(&self, rows: &[RegionAggregate]) -> Result<usize, DbError> {
        Self::certify_rows(rows)?;
        let connection = self.database_client.get_connection()?;

        let mut written_total = 0usize;
        for burst in rows.chunks(AGGREGATE_INSERT_BATCH) {
            let burst_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

            for row in burst {
                burst_transaction
                    .execute(
                        "DELETE FROM state_aggregates_staging WHERE state_code = ?1",
                        params![row.state.clone()],
                    )
                    .await?;

                let insert_sql = format!(
                    "INSERT INTO state_aggregates_staging (state_code, region_name, {AGGREGATE_VALUE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)"
                );
                burst_transaction
                    .execute(
                        &insert_sql,
                        aggregate_row_params!(row, row.state.clone(), row.name.clone()),
                    )
                    .await?;
            }

            burst_transaction
                .commit()
                .await
                .map_err(|_| DbError::TransactionError)?;
            written_total += burst.len();
        }

        debug!("🏛️ [AGGREGATE_REPO]: {} state rows crystallized.", written_total);
        Ok(written_total)
    }

    /// Reemplaza filas de condado de staging, identidad por FIPS.
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn replace_county_rows(&self, rows: &[RegionAggregate]) -> Result<usize, DbError> {
        Self::certify_rows(rows)?;
        let connection = self.database_client.get_connection()?;

        let mut written_total = 0usize;
        for burst in rows.chunks(AGGREGATE_INSERT_BATCH) {
            let burst_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

            for row in burst {
                let county_fips = row.county_fips.clone().ok_or_else(|| {
                    DbError::IntegrityViolation(format!(
                        "county aggregate without fips: [{}/{}]",
                        row.state, row.name
                    ))
                })?;

                burst_transaction
                    .execute(
                        "DELETE FROM county_aggregates_staging WHERE county_fips = ?1",
                        params![county_fips.clone()],
                    )
                    .await?;

                let insert_sql = format!(
                    "INSERT INTO county_aggregates_staging (county_fips, state_code, region_name, {AGGREGATE_VALUE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
                );
                burst_transaction
                    .execute(
                        &insert_sql,
                        aggregate_row_params!(row, county_fips, row.state.clone(), row.name.clone()),
                    )
                    .await?;
            }

            burst_transaction
                .commit()
                .await
                .map_err(|_| DbError::TransactionError)?;
            written_total += burst.len();
        }

        debug!("🏛️ [AGGREGATE_REPO]: {} county rows crystallized.", written_total);
        Ok(written_total)
    }

    /// Reemplaza filas ZIP de staging, identidad por (zip, estado).
    #[instrument(skip(self, rows), fields(row_count = rows.len()))]
    pub async fn replace_zip_rows(&self, rows: &[RegionAggregate]) -> Result<usize, DbError> {
        Self::certify_rows(rows)?;
        let connection = self.database_client.get_connection()?;

        let mut written_total = 0usize;
        for burst in rows.chunks(AGGREGATE_INSERT_BATCH) {
            let burst_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

            for row in burst {
                let zip_code = row.zip.clone().ok_or_else(|| {
                    DbError::IntegrityViolation(format!(
                        "zip aggregate without zip code: [{}/{}]",
                        row.state, row.name
                    ))
                })?;

                burst_transaction
                    .execute(
                        "DELETE FROM zip_aggregates_staging WHERE zip_code = ?1 AND state_code = ?2",
                        params![zip_code.clone(), row.state.clone()],
                    )
                    .await?;

                let insert_sql = format!(
                    "INSERT INTO zip_aggregates_staging (zip_code, state_code, region_name, {AGGREGATE_VALUE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
                );
                burst_transaction
                    .execute(
                        &insert_sql,
                        aggregate_row_params!(row, zip_code, row.state.clone(), row.name.clone()),
                    )
                    .await?;
            }

            burst_transaction
                .commit()
                .await
                .map_err(|_| DbError::TransactionError)?;
            written_total += burst.len();
        }

        debug!("🏛️ [AGGREGATE_REPO]: {} zip rows crystallized.", written_total);
        Ok(written_total)
    }

    /// Borra la fila ZIP de staging de un ZIP que quedó sin estaciones;
    /// su ausencia tras la promoción es el estado correcto.
    pub async fn delete_staging_zip_row(&self, zip_key: &ZipKey) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "DELETE FROM zip_aggregates_staging WHERE zip_code = ?1 AND state_code = ?2",
                params![zip_key.zip.clone(), zip_key.state.clone()],
            )
            .await?;
        Ok(())
    }

    /// Censo por nivel de la fila ZIP de serving, para el filtro de
    /// ZIPs ya-actuales del centinela. None si la fila no existe.
    pub async fn serving_zip_census(&self, zip_key: &ZipKey) -> Result<Option<ChargerCensus>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query(
                "SELECT total_chargers, dcfast_count, level2_count, level1_count \
                 FROM zip_aggregates WHERE zip_code = ?1 AND state_code = ?2",
                params![zip_key.zip.clone(), zip_key.state.clone()],
            )
            .await?;

        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        Ok(Some(ChargerCensus {
            total: data_row.get::<i64>(0)? as u32,
            dcfast: data_row.get::<i64>(1)? as u32,
            level2: data_row.get::<i64>(2)? as u32,
            level1: data_row.get::<i64>(3)? as u32,
        }))
    }

    /// Claves ZIP presentes en el staging de agregados; insumo del
    /// cálculo de completitud del conveyor.
    pub async fn staging_zip_keys(&self) -> Result<BTreeSet<ZipKey>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query("SELECT zip_code, state_code FROM zip_aggregates_staging", ())
            .await?;

        let mut zip_keys = BTreeSet::new();
        while let Some(data_row) = query_results.next().await? {
            zip_keys.insert(ZipKey {
                zip: data_row.get(0)?,
                state: data_row.get(1)?,
            });
        }
        Ok(zip_keys)
    }

    /// Conteo de filas staging de una resolución (puerta de promoción).
    pub async fn count_staging(&self, kind: RegionKind) -> Result<u64, DbError> {
        let staging_table = match kind {
            RegionKind::State => "state_aggregates_staging",
            RegionKind::County => "county_aggregates_staging",
            RegionKind::Zip => "zip_aggregates_staging",
        };

        let connection = self.database_client.get_connection()?;
        let count_sql = format!("SELECT COUNT(*) FROM {staging_table}");
        let mut query_results = connection.query(&count_sql, ()).await?;
        let data_row = query_results
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("COUNT returned no row".to_string()))?;
        Ok(data_row.get::<i64>(0)? as u64)
    }

    /// Fila estatal de un estrato, para auditoría y Proving Grounds.
    pub async fn state_row(
        &self,
        staging: bool,
        state_code: &str,
    ) -> Result<Option<RegionAggregate>, DbError> {
        let table = if staging { "state_aggregates_staging" } else { "state_aggregates" };
        let select_sql = format!(
            "SELECT state_code, region_name, {AGGREGATE_VALUE_COLUMNS} FROM {table} WHERE state_code = ?1"
        );

        let connection = self.database_client.get_connection()?;
        let mut query_results = connection.query(&select_sql, params![state_code]).await?;
        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        let mut aggregate = Self::aggregate_from_row(&data_row, RegionKind::State, 2)?;
        aggregate.state = data_row.get(0)?;
        aggregate.name = data_row.get(1)?;
        Ok(Some(aggregate))
    }

    /// Fila ZIP de un estrato.
    pub async fn zip_row(
        &self,
        staging: bool,
        zip_key: &ZipKey,
    ) -> Result<Option<RegionAggregate>, DbError> {
        let table = if staging { "zip_aggregates_staging" } else { "zip_aggregates" };
        let select_sql = format!(
            "SELECT zip_code, state_code, region_name, {AGGREGATE_VALUE_COLUMNS} FROM {table} \
             WHERE zip_code = ?1 AND state_code = ?2"
        );

        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query(&select_sql, params![zip_key.zip.clone(), zip_key.state.clone()])
            .await?;
        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        let mut aggregate = Self::aggregate_from_row(&data_row, RegionKind::Zip, 3)?;
        aggregate.zip = Some(data_row.get(0)?);
        aggregate.state = data_row.get(1)?;
        aggregate.name = data_row.get(2)?;
        Ok(Some(aggregate))
    }

    /// Fila de condado de un estrato, identidad por FIPS.
    pub async fn county_row(
        &self,
        staging: bool,
        county_fips: &str,
    ) -> Result<Option<RegionAggregate>, DbError> {
        let table = if staging { "county_aggregates_staging" } else { "county_aggregates" };
        let select_sql = format!(
            "SELECT county_fips, state_code, region_name, {AGGREGATE_VALUE_COLUMNS} FROM {table} \
             WHERE county_fips = ?1"
        );

        let connection = self.database_client.get_connection()?;
        let mut query_results = connection.query(&select_sql, params![county_fips]).await?;
        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        let mut aggregate = Self::aggregate_from_row(&data_row, RegionKind::County, 3)?;
        aggregate.county_fips = Some(data_row.get(0)?);
        aggregate.state = data_row.get(1)?;
        aggregate.name = data_row.get(2)?;
        Ok(Some(aggregate))
    }

    /// Mapea las columnas de valores compartidas desde `value_offset`.
    fn aggregate_from_row(
        data_row: &Row,
        kind: RegionKind,
        value_offset: i32,
    ) -> Result<RegionAggregate, DbError> {
        let get_u32 = |index: i32| -> Result<u32, DbError> {
            Ok(data_row.get::<i64>(value_offset + index)? as u32)
        };

        let zoom_label: String = data_row.get(value_offset + 20)?;
        let zoom_range = match zoom_label.as_str() {
            "state_tier" => ZoomRange::StateTier,
            "county_tier" => ZoomRange::CountyTier,
            "zip_tier" => ZoomRange::ZipTier,
            other => {
                return Err(DbError::MappingError(format!(
                    "unknown zoom_range label [{other}]"
                )))
            }
        };

        Ok(RegionAggregate {
            kind,
            state: String::new(),
            name: String::new(),
            county_fips: None,
            zip: None,
            center_latitude: data_row.get(value_offset)?,
            center_longitude: data_row.get(value_offset + 1)?,
            population: data_row.get::<i64>(value_offset + 2)? as u64,
            population_is_estimated: data_row.get::<i64>(value_offset + 3)? != 0,
            chargers: ChargerCensus {
                total: get_u32(4)?,
                dcfast: get_u32(5)?,
                level2: get_u32(6)?,
                level1: get_u32(7)?,
            },
            connectors: ConnectorCensus {
                tesla: get_u32(8)?,
                ccs: get_u32(9)?,
                j1772: get_u32(10)?,
                chademo: get_u32(11)?,
            },
            ports: PortCensus {
                tesla: get_u32(12)?,
                ccs: get_u32(13)?,
                j1772: get_u32(14)?,
                chademo: get_u32(15)?,
                total: get_u32(16)?,
            },
            need_score: data_row.get::<i64>(value_offset + 17)? as u8,
            ev_infrastructure_score: data_row.get::<i64>(value_offset + 18)? as u8,
            vmt_per_capita: data_row.get::<Option<f64>>(value_offset + 19)?,
            zoom_range,
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/repositories/aggregate.rs]
