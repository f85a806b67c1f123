// INICIO DEL ARCHIVO [libs/infra/uplink-client/src/vmt.rs]
/*!
 * =================================================================
 * APARATO: VMT TRAFFIC UPLINK CLIENT (V2.3 - PAGED HARVEST)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: COSECHA PAGINADA DE VMT ANUAL POR CONDADO
 *
 * El servicio publica una colección de features paginada, indexada por
 * FIPS de 5 caracteres con el VMT anual. El núcleo divide entre 365
 * para el VMT diario y entre población para el per-cápita; aquí sólo
 * se cosecha la cifra anual.
 * =================================================================
 */

use crate::backoff::{retry_with_backoff, UPLINK_TIMEOUT};
use crate::errors::UplinkError;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};
use voltaic_domain_models::CountyVmtRecord;

/// Endpoint del servicio de tráfico (feature service de VMT condal).
pub const DEFAULT_VMT_URL: &str =
    "https://services.arcgis.com/xOi1kZaI0eWDREZv/arcgis/rest/services/County_VMT/FeatureServer/0/query";

/// Registros por página de cosecha.
const PAGE_SIZE: usize = 1_000;

/// Contrato del servicio de tráfico. La unión VMT es opcional: su fallo
/// deja la tabla previa intacta y jamás aborta un ciclo.
#[allow(async_fn_in_trait)]
pub trait VmtGateway: Send + Sync {
    /// Cosecha completa del VMT anual por condado.
    async fn fetch_county_vmt(&self) -> Result<Vec<CountyVmtRecord>, UplinkError>;
}

/// Cliente real del servicio de tráfico.
pub struct VmtUplinkClient {
    internal_http_session: Client,
    vmt_endpoint_url: String,
}

#[derive(Deserialize)]
struct VmtFeatureAttributesSchema {
    #[serde(rename = "COUNTY_FIPS")]
    county_fips: Option<String>,
    #[serde(rename = "ANNUAL_VMT")]
    annual_vmt: Option<f64>,
}

#[derive(Deserialize)]
struct VmtFeatureSchema {
    attributes: VmtFeatureAttributesSchema,
}

#[derive(Deserialize)]
struct VmtPageSchema {
    #[serde(default)]
    features: Vec<VmtFeatureSchema>,
    #[serde(rename = "exceededTransferLimit", default)]
    exceeded_transfer_limit: bool,
}

impl VmtUplinkClient {
    #[must_use]
    pub fn new(vmt_endpoint_url: String) -> Self {
        Self {
            internal_http_session: Client::builder()
                .timeout(UPLINK_TIMEOUT)
                .user_agent("Voltaic-Atlas-Refresh/V3")
                .build()
                .expect("CRITICAL: Failed to initialize HTTP session"),
            vmt_endpoint_url,
        }
    }

    async fn fetch_page(&self, result_offset: usize) -> Result<VmtPageSchema, UplinkError> {
        let network_response = self
            .internal_http_session
            .get(&self.vmt_endpoint_url)
            .query(&[
                ("where", "1=1".to_string()),
                ("outFields", "COUNTY_FIPS,ANNUAL_VMT".to_string()),
                ("f", "json".to_string()),
                ("resultOffset", result_offset.to_string()),
                ("resultRecordCount", PAGE_SIZE.to_string()),
            ])
            .send()
            .await?;

        if !network_response.status().is_success() {
            return Err(UplinkError::ProviderRejection {
                status: network_response.status().as_u16(),
            });
        }

        network_response
            .json::<VmtPageSchema>()
            .await
            .map_err(|fault| UplinkError::MalformedPayload(fault.to_string()))
    }
}

impl VmtGateway for VmtUplinkClient {
    #[instrument(skip(self))]
    async fn fetch_county_vmt(&self) -> Result<Vec<CountyVmtRecord>, UplinkError> {
        let mut harvested_records = Vec::new();
        let mut result_offset = 0usize;

        loop {
            let page =
                retry_with_backoff("vmt_page", || self.fetch_page(result_offset)).await?;

            let page_feature_count = page.features.len();
            for feature in page.features {
                let (Some(county_fips), Some(annual_vmt)) =
                    (feature.attributes.county_fips, feature.attributes.annual_vmt)
                else {
                    continue;
                };
                if county_fips.len() != 5 {
                    continue;
                }
                harvested_records.push(CountyVmtRecord { county_fips, annual_vmt });
            }

            if !page.exceeded_transfer_limit || page_feature_count == 0 {
                break;
            }
            result_offset += page_feature_count;
        }

        info!(
            "🚗 [VMT_UPLINK]: Harvest complete with {} county records.",
            harvested_records.len()
        );

        Ok(harvested_records)
    }
}
// FIN DEL ARCHIVO [libs/infra/uplink-client/src/vmt.rs]
