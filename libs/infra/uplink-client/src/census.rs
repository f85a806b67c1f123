// INICIO DEL ARCHIVO [libs/infra/uplink-client/src/census.rs]
/*!
 * =================================================================
 * APARATO: CENSUS POPULATION UPLINK CLIENT (V3.4 - BATCH AWARE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: EXTRACCIÓN DE POBLACIÓN POR ESTADO / CONDADO / ZCTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. HEADER-ROW PROTOCOL: El servicio censal responde una matriz JSON
 *    cuya primera fila son cabeceras; la población viaja como entero
 *    en formato string.
 * 2. BATCH CEILING: El formulario ZCTA acepta hasta 50 códigos por
 *    petición; códigos ausentes no son error, simplemente no aparecen
 *    en el mapa de respuesta.
 * 3. LADDER SHIELD: Toda petición viaja con la escalera 1s/2s/4s.
 * =================================================================
 */

use crate::backoff::{retry_with_backoff, UPLINK_TIMEOUT};
use crate::errors::UplinkError;
use reqwest::Client;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Endpoint del American Community Survey (población total B01003_001E).
pub const DEFAULT_CENSUS_URL: &str = "https://api.census.gov/data/2021/acs/acs5";

/// Techo de códigos ZCTA por petición del formulario batch.
pub const ZIP_BATCH_CEILING: usize = 50;

/// Columna de población total del ACS.
const POPULATION_COLUMN: &str = "B01003_001E";
/// Columna de nombre visible de la región.
const NAME_COLUMN: &str = "NAME";
/// Columna geográfica del formulario ZCTA.
const ZCTA_COLUMN: &str = "zip code tabulation area";

/// Resultado de una consulta censal viva.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationFetch {
    pub value: u64,
    pub display_name: Option<String>,
}

/// Contrato del servicio censal. Costura de pruebas del oráculo
/// demográfico.
#[allow(async_fn_in_trait)]
pub trait PopulationGateway: Send + Sync {
    /// Población de un estado por FIPS de 2 dígitos.
    async fn fetch_state_population(&self, state_fips: &str) -> Result<PopulationFetch, UplinkError>;

    /// Población de un condado por FIPS de 5 caracteres.
    async fn fetch_county_population(&self, county_fips: &str) -> Result<PopulationFetch, UplinkError>;

    /// Formulario batch: hasta 50 ZCTAs por petición. Códigos no
    /// reconocidos por el censo quedan fuera del mapa sin error.
    async fn fetch_zip_population_batch(
        &self,
        zip_codes: &[String],
    ) -> Result<HashMap<String, PopulationFetch>, UplinkError>;
}

/// Cliente real del servicio censal.
pub struct CensusPopulationClient {
    internal_http_session: Client,
    census_endpoint_url: String,
    census_api_key: String,
}

impl CensusPopulationClient {
    #[must_use]
    pub fn new(census_endpoint_url: String, census_api_key: String) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(UPLINK_TIMEOUT)
                .user_agent("Voltaic-Atlas-Refresh/V3")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            census_endpoint_url,
            census_api_key,
        }
    }

    /// Ejecuta una consulta censal y devuelve la matriz cruda
    /// (cabeceras + filas de valores).
    async fn execute_matrix_query(
        &self,
        geography_clause: &[(&str, String)],
    ) -> Result<Vec<Vec<serde_json::Value>>, UplinkError> {
        let mut query_parameters: Vec<(&str, String)> = vec![
            ("get", format!("{NAME_COLUMN},{POPULATION_COLUMN}")),
            ("key", self.census_api_key.clone()),
        ];
        query_parameters.extend(geography_clause.iter().cloned());

        let network_response = self
            .internal_http_session
            .get(&self.census_endpoint_url)
            .query(&query_parameters)
            .send()
            .await?;

        if !network_response.status().is_success() {
            return Err(UplinkError::ProviderRejection {
                status: network_response.status().as_u16(),
            });
        }

        network_response
            .json::<Vec<Vec<serde_json::Value>>>()
            .await
            .map_err(|fault| UplinkError::MalformedPayload(fault.to_string()))
    }

    /// Localiza una columna en la fila de cabeceras.
    fn column_index(headers: &[serde_json::Value], column_name: &str) -> Option<usize> {
        headers
            .iter()
            .position(|cell| cell.as_str() == Some(column_name))
    }

    /// Decodifica la población entero-como-string de una celda.
    fn decode_population_cell(cell: &serde_json::Value) -> Result<u64, UplinkError> {
        cell.as_str()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .or_else(|| cell.as_u64())
            .ok_or_else(|| {
                UplinkError::MalformedPayload(format!("non-integer population cell: {cell}"))
            })
    }

    /// Extrae `(población, nombre)` de la primera fila de datos.
    fn decode_single_region(
        matrix: &[Vec<serde_json::Value>],
    ) -> Result<PopulationFetch, UplinkError> {
        let headers = matrix
            .first()
            .ok_or_else(|| UplinkError::MalformedPayload("empty census matrix".to_string()))?;
        let population_index = Self::column_index(headers, POPULATION_COLUMN)
            .ok_or_else(|| UplinkError::MalformedPayload("population column missing".to_string()))?;
        let name_index = Self::column_index(headers, NAME_COLUMN);

        let data_row = matrix
            .get(1)
            .ok_or_else(|| UplinkError::MalformedPayload("census matrix has no data row".to_string()))?;

        Ok(PopulationFetch {
            value: Self::decode_population_cell(&data_row[population_index])?,
            display_name: name_index
                .and_then(|index| data_row.get(index))
                .and_then(|cell| cell.as_str())
                .map(str::to_string),
        })
    }
}

impl PopulationGateway for CensusPopulationClient {
    #[instrument(skip(self))]
    async fn fetch_state_population(&self, state_fips: &str) -> Result<PopulationFetch, UplinkError> {
        let geography = vec![("for", format!("state:{state_fips}"))];
        let matrix = retry_with_backoff("census_state", || self.execute_matrix_query(&geography)).await?;
        Self::decode_single_region(&matrix)
    }

    #[instrument(skip(self))]
    async fn fetch_county_population(&self, county_fips: &str) -> Result<PopulationFetch, UplinkError> {
        if county_fips.len() != 5 {
            return Err(UplinkError::MalformedPayload(format!(
                "county fips must be 5 chars, got [{county_fips}]"
            )));
        }
        let (state_prefix, county_suffix) = county_fips.split_at(2);
        let geography = vec![
            ("for", format!("county:{county_suffix}")),
            ("in", format!("state:{state_prefix}")),
        ];

        let matrix = retry_with_backoff("census_county", || self.execute_matrix_query(&geography)).await?;
        Self::decode_single_region(&matrix)
    }

    #[instrument(skip(self, zip_codes), fields(batch_size = zip_codes.len()))]
    async fn fetch_zip_population_batch(
        &self,
        zip_codes: &[String],
    ) -> Result<HashMap<String, PopulationFetch>, UplinkError> {
        if zip_codes.is_empty() {
            return Ok(HashMap::new());
        }
        if zip_codes.len() > ZIP_BATCH_CEILING {
            return Err(UplinkError::MalformedPayload(format!(
                "zcta batch of {} exceeds ceiling {ZIP_BATCH_CEILING}",
                zip_codes.len()
            )));
        }

        let joined_codes = zip_codes.join(",");
        let geography = vec![("for", format!("{ZCTA_COLUMN}:{joined_codes}"))];
        let matrix = retry_with_backoff("census_zcta_batch", || self.execute_matrix_query(&geography)).await?;

        let headers = matrix
            .first()
            .ok_or_else(|| UplinkError::MalformedPayload("empty census matrix".to_string()))?;
        let population_index = Self::column_index(headers, POPULATION_COLUMN)
            .ok_or_else(|| UplinkError::MalformedPayload("population column missing".to_string()))?;
        let name_index = Self::column_index(headers, NAME_COLUMN);
        let zcta_index = Self::column_index(headers, ZCTA_COLUMN)
            .ok_or_else(|| UplinkError::MalformedPayload("zcta column missing".to_string()))?;

        let mut population_by_zip = HashMap::new();
        for data_row in matrix.iter().skip(1) {
            let Some(zcta_code) = data_row.get(zcta_index).and_then(|cell| cell.as_str()) else {
                continue;
            };
            let Some(population_cell) = data_row.get(population_index) else {
                continue;
            };
            // Celdas nulas del censo: el código existe pero sin dato;
            // se trata como ausente y degradará a estimación.
            let Ok(population_value) = Self::decode_population_cell(population_cell) else {
                continue;
            };

            population_by_zip.insert(
                zcta_code.to_string(),
                PopulationFetch {
                    value: population_value,
                    display_name: name_index
                        .and_then(|index| data_row.get(index))
                        .and_then(|cell| cell.as_str())
                        .map(str::to_string),
                },
            );
        }

        debug!(
            "🗺️ [CENSUS_UPLINK]: ZCTA batch resolved {} of {} requested codes.",
            population_by_zip.len(),
            zip_codes.len()
        );

        Ok(population_by_zip)
    }
}
// FIN DEL ARCHIVO [libs/infra/uplink-client/src/census.rs]
