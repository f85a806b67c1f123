// INICIO DEL ARCHIVO [libs/infra/uplink-client/src/registry.rs]
/*!
 * =================================================================
 * APARATO: STATION REGISTRY UPLINK CLIENT (V3.2 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: EXTRACCIÓN DEL CENSO FEDERAL DE ESTACIONES EV
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FULL SNAPSHOT: Una sola petición con limit=all; el diff contra
 *    serving exige el censo completo, no una paginación parcial.
 * 2. NO RETRY: El fallo del registro aborta el ciclo (upstream-error);
 *    el conductor no reintenta dentro del mismo ciclo.
 * =================================================================
 */

use crate::errors::UplinkError;
use crate::backoff::UPLINK_TIMEOUT;
use serde::Deserialize;
use reqwest::Client;
use tracing::{info, instrument};
use voltaic_domain_models::RawFuelStationRecord;

/// Endpoint del registro federal de estaciones de combustible alterno.
pub const DEFAULT_REGISTRY_URL: &str = "https://developer.nrel.gov/api/alt_fuel_stations/v1.json";

/// Contrato del censo de estaciones. La costura de pruebas del driver
/// de ingesta: producción inyecta `StationRegistryClient`, el Proving
/// Grounds inyecta dobles deterministas.
#[allow(async_fn_in_trait)]
pub trait RegistrySource: Send + Sync {
    /// Censo completo de estaciones eléctricas abiertas en EE.UU.
    async fn fetch_full_registry(&self) -> Result<Vec<RawFuelStationRecord>, UplinkError>;
}

/// Cliente real del registro federal.
pub struct StationRegistryClient {
    internal_http_session: Client,
    registry_endpoint_url: String,
    registry_api_key: String,
}

impl StationRegistryClient {
    /// Construye una instancia con timeout de grado industrial (5 s).
    #[must_use]
    pub fn new(registry_endpoint_url: String, registry_api_key: String) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(UPLINK_TIMEOUT)
                .user_agent("Voltaic-Atlas-Refresh/V3")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            registry_endpoint_url,
            registry_api_key,
        }
    }
}

impl RegistrySource for StationRegistryClient {
    #[instrument(skip(self))]
    async fn fetch_full_registry(&self) -> Result<Vec<RawFuelStationRecord>, UplinkError> {
        info!("📡 [REGISTRY_UPLINK]: Requesting full electric station census...");

        let network_response = self
            .internal_http_session
            .get(&self.registry_endpoint_url)
            .query(&[
                ("api_key", self.registry_api_key.as_str()),
                ("fuel_type", "ELEC"),
                ("country", "US"),
                ("limit", "all"),
                ("status", "E"),
            ])
            .send()
            .await?;

        if !network_response.status().is_success() {
            return Err(UplinkError::ProviderRejection {
                status: network_response.status().as_u16(),
            });
        }

        /// Envolvente del payload federal: `{ "fuel_stations": [...] }`.
        #[derive(Deserialize)]
        struct RegistryEnvelopeSchema {
            fuel_stations: Vec<RawFuelStationRecord>,
        }

        let decoded_payload: RegistryEnvelopeSchema = network_response
            .json()
            .await
            .map_err(|fault| UplinkError::MalformedPayload(fault.to_string()))?;

        info!(
            "📦 [REGISTRY_UPLINK]: Census acquired with {} raw records.",
            decoded_payload.fuel_stations.len()
        );

        Ok(decoded_payload.fuel_stations)
    }
}
// FIN DEL ARCHIVO [libs/infra/uplink-client/src/registry.rs]
