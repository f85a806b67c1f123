// INICIO DEL ARCHIVO [libs/infra/db-turso/src/repositories/station.rs]
/*!
 * =================================================================
 * APARATO: STATION CENSUS REPOSITORY (V3.5 - DUAL STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DEL CENSO DE ESTACIONES (STAGING/SERVING)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. STRATA DISCIPLINE: El ciclo escribe EXCLUSIVAMENTE en staging;
 *    serving sólo se lee (diff, filtros bbox de la ruta de lectura).
 * 2. TRANSACTIONAL BURSTS: Cada ráfaga de inserción viaja en una
 *    transacción ACID; el driver de ingesta decide el tamaño de ráfaga.
 * 3. POLYGON RPC: stations_in_polygon = prefiltro bbox + refinado
 *    ray-casting, la aproximación del rpc del almacén.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::DateTime;
use libsql::{params, Row};
use std::collections::HashMap;
use tracing::{debug, instrument};
use voltaic_core_geospatial::{point_in_ring, ring_bounding_box, BoundingBox, Ring};
use voltaic_domain_models::{CanonicalStation, ChargerLevel, ConnectorType, ZipKey};

/// Estrato de tabla sobre el que opera una consulta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStratum {
    /// Tabla llana: atiende consultas del atlas.
    Serving,
    /// Tabla `_staging`: propiedad exclusiva del ciclo en curso.
    Staging,
}

impl StationStratum {
    #[must_use]
    pub fn table_name(&self) -> &'static str {
        match self {
            StationStratum::Serving => "stations",
            StationStratum::Staging => "stations_staging",
        }
    }
}

/// Columnas canónicas en el orden de mapeo de filas.
const STATION_COLUMNS: &str = "external_id, name, latitude, longitude, street_address, city, state, zip, level, num_ports, connectors_json, network, created_at";

/// Repositorio de autoridad única para el censo de estaciones.
pub struct StationRepository {
    database_client: TursoClient,
}

impl StationRepository {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Vacía el estrato staging. Primera operación de todo ciclo de
    /// ingesta; garantiza la idempotencia del driver.
    #[instrument(skip(self))]
    pub async fn truncate_staging(&self) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute("DELETE FROM stations_staging", ())
            .await?;
        debug!("🧹 [STATION_REPO]: Staging stratum truncated.");
        Ok(())
    }

    /// Cristaliza una ráfaga de estaciones canónicas en staging dentro
    /// de una transacción ACID.
    #[instrument(skip(self, stations), fields(burst_size = stations.len()))]
    pub async fn insert_staging_burst(
        &self,
        stations: &[CanonicalStation],
    ) -> Result<usize, DbError> {
        if stations.is_empty() {
            return Ok(0);
        }

        let connection = self.database_client.get_connection()?;
        let burst_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

        let insert_sql = format!(
            "INSERT OR REPLACE INTO stations_staging ({STATION_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        );

        for station in stations {
            let connectors_json = serde_json::to_string(&station.connectors)
                .map_err(|fault| DbError::MappingError(fault.to_string()))?;

            burst_transaction
                .execute(
                    &insert_sql,
                    params![
                        station.external_id,
                        station.name.clone(),
                        station.latitude,
                        station.longitude,
                        station.street_address.clone(),
                        station.city.clone(),
                        station.state.clone(),
                        station.zip.clone(),
                        station.level.as_label(),
                        station.num_ports as i64,
                        connectors_json,
                        station.network.clone(),
                        station.created_at.to_rfc3339(),
                    ],
                )
                .await?;
        }

        burst_transaction
            .commit()
            .await
            .map_err(|_| DbError::TransactionError)?;

        Ok(stations.len())
    }

    /// Índice `identificador -> estación` de un estrato completo.
    /// Insumo del centinela de cambios.
    #[instrument(skip(self))]
    pub async fn load_station_index(
        &self,
        stratum: StationStratum,
    ) -> Result<HashMap<i64, CanonicalStation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let select_sql = format!(
            "SELECT {STATION_COLUMNS} FROM {}",
            stratum.table_name()
        );

        let mut query_results = connection.query(&select_sql, ()).await?;
        let mut station_index = HashMap::new();

        while let Some(data_row) = query_results.next().await? {
            let station = Self::station_from_row(&data_row)?;
            station_index.insert(station.external_id, station);
        }

        Ok(station_index)
    }

    /// Conteo de filas de un estrato (guardia de truncamiento del conductor).
    pub async fn count(&self, stratum: StationStratum) -> Result<u64, DbError> {
        let connection = self.database_client.get_connection()?;
        let count_sql = format!("SELECT COUNT(*) FROM {}", stratum.table_name());

        let mut query_results = connection.query(&count_sql, ()).await?;
        let data_row = query_results
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("COUNT returned no row".to_string()))?;

        Ok(data_row.get::<i64>(0)? as u64)
    }

    /// Censo completo del estrato staging (pasada de agregación estatal).
    pub async fn staging_all(&self) -> Result<Vec<CanonicalStation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let select_sql = format!("SELECT {STATION_COLUMNS} FROM stations_staging");

        let mut query_results = connection.query(&select_sql, ()).await?;
        let mut stations = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            stations.push(Self::station_from_row(&data_row)?);
        }
        Ok(stations)
    }

    /// Estaciones de staging para un lote de claves ZIP. Una sola
    /// consulta por lote; el filtro de estado se refina en memoria.
    #[instrument(skip(self, zip_keys), fields(zip_count = zip_keys.len()))]
    pub async fn staging_for_zip_keys(
        &self,
        zip_keys: &[ZipKey],
    ) -> Result<Vec<CanonicalStation>, DbError> {
        if zip_keys.is_empty() {
            return Ok(Vec::new());
        }

        // Guardia de inyección: un ZIP canónico es estrictamente numérico.
        let sanitized_zip_list: Vec<String> = zip_keys
            .iter()
            .filter(|key| key.zip.len() == 5 && key.zip.chars().all(|c| c.is_ascii_digit()))
            .map(|key| format!("'{}'", key.zip))
            .collect();

        if sanitized_zip_list.is_empty() {
            return Ok(Vec::new());
        }

        let select_sql = format!(
            "SELECT {STATION_COLUMNS} FROM stations_staging WHERE zip IN ({})",
            sanitized_zip_list.join(",")
        );

        let connection = self.database_client.get_connection()?;
        let mut query_results = connection.query(&select_sql, ()).await?;
        let mut stations = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            let station = Self::station_from_row(&data_row)?;
            let matches_key = station.zip.as_ref().is_some_and(|zip| {
                zip_keys
                    .iter()
                    .any(|key| key.zip == *zip && key.state == station.state)
            });
            if matches_key {
                stations.push(station);
            }
        }
        Ok(stations)
    }

    /// Candidatas de staging dentro de la caja envolvente de un condado.
    pub async fn staging_in_state_bbox(
        &self,
        state_code: &str,
        bounding: &BoundingBox,
    ) -> Result<Vec<CanonicalStation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let select_sql = format!(
            "SELECT {STATION_COLUMNS} FROM stations_staging \
             WHERE state = ?1 AND latitude BETWEEN ?2 AND ?3 AND longitude BETWEEN ?4 AND ?5"
        );

        let mut query_results = connection
            .query(
                &select_sql,
                params![
                    state_code,
                    bounding.min_latitude,
                    bounding.max_latitude,
                    bounding.min_longitude,
                    bounding.max_longitude,
                ],
            )
            .await?;

        let mut stations = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            stations.push(Self::station_from_row(&data_row)?);
        }
        Ok(stations)
    }

    /// Filtro bbox sobre serving: el contrato de la ruta de lectura.
    pub async fn serving_in_bbox(
        &self,
        bounding: &BoundingBox,
    ) -> Result<Vec<CanonicalStation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let select_sql = format!(
            "SELECT {STATION_COLUMNS} FROM stations \
             WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4"
        );

        let mut query_results = connection
            .query(
                &select_sql,
                params![
                    bounding.min_latitude,
                    bounding.max_latitude,
                    bounding.min_longitude,
                    bounding.max_longitude,
                ],
            )
            .await?;

        let mut stations = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            stations.push(Self::station_from_row(&data_row)?);
        }
        Ok(stations)
    }

    /// rpc stations_in_polygon: prefiltro por caja envolvente del anillo
    /// y refinado punto-en-polígono en memoria.
    #[instrument(skip(self, polygon_rings))]
    pub async fn staging_in_polygon(
        &self,
        polygon_rings: &[Ring],
    ) -> Result<Vec<CanonicalStation>, DbError> {
        let Some(prefilter_box) = polygon_rings
            .iter()
            .filter_map(|ring| ring_bounding_box(ring))
            .reduce(|accumulated, next| BoundingBox {
                min_latitude: accumulated.min_latitude.min(next.min_latitude),
                max_latitude: accumulated.max_latitude.max(next.max_latitude),
                min_longitude: accumulated.min_longitude.min(next.min_longitude),
                max_longitude: accumulated.max_longitude.max(next.max_longitude),
            })
        else {
            return Ok(Vec::new());
        };

        let connection = self.database_client.get_connection()?;
        let select_sql = format!(
            "SELECT {STATION_COLUMNS} FROM stations_staging \
             WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4"
        );

        let mut query_results = connection
            .query(
                &select_sql,
                params![
                    prefilter_box.min_latitude,
                    prefilter_box.max_latitude,
                    prefilter_box.min_longitude,
                    prefilter_box.max_longitude,
                ],
            )
            .await?;

        let mut contained_stations = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            let station = Self::station_from_row(&data_row)?;
            let is_contained = polygon_rings
                .iter()
                .any(|ring| point_in_ring(station.latitude, station.longitude, ring));
            if is_contained {
                contained_stations.push(station);
            }
        }
        Ok(contained_stations)
    }

    /// Transmuta una fila SQL en la estación canónica del dominio.
    fn station_from_row(data_row: &Row) -> Result<CanonicalStation, DbError> {
        let level_label: String = data_row.get(8)?;
        let level = ChargerLevel::from_label(&level_label).ok_or_else(|| {
            DbError::MappingError(format!("unknown charger level label [{level_label}]"))
        })?;

        let connectors_json: String = data_row.get(10)?;
        let connectors: Vec<ConnectorType> = serde_json::from_str(&connectors_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        let created_at_text: String = data_row.get(12)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_text)
            .map_err(|fault| DbError::MappingError(format!("bad created_at: {fault}")))?
            .with_timezone(&chrono::Utc);

        Ok(CanonicalStation {
            external_id: data_row.get(0)?,
            name: data_row.get(1)?,
            latitude: data_row.get(2)?,
            longitude: data_row.get(3)?,
            street_address: data_row.get::<Option<String>>(4)?,
            city: data_row.get::<Option<String>>(5)?,
            state: data_row.get(6)?,
            zip: data_row.get::<Option<String>>(7)?,
            level,
            num_ports: data_row.get::<i64>(9)? as u32,
            connectors,
            network: data_row.get::<Option<String>>(11)?,
            created_at,
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/repositories/station.rs]
