// INICIO DEL ARCHIVO [libs/domain/models-rs/src/demographics.rs]
/*!
 * =================================================================
 * APARATO: DEMOGRAPHICS REFERENCE MODEL (V2.1 - ORACLE CONTRACT)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE POBLACIÓN Y TRÁFICO (VMT)
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Origen del valor de población entregado por el oráculo demográfico.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationProvenance {
    /// Respuesta fresca del servicio censal.
    Live,
    /// Acierto de caché dentro del TTL de 30 días.
    Cached,
    /// Estimación de respaldo tras fallo terminal del uplink.
    Estimate,
}

/// Registro de población para una región, con su procedencia.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationRecord {
    #[typeshare(serialized_as = "number")]
    pub value: u64,
    pub provenance: PopulationProvenance,
    /// Nombre visible de la región según el servicio censal, si lo entregó.
    #[serde(rename = "region_display_name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "fetched_at_timestamp", skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl PopulationRecord {
    /// Un registro estimado marca la fila de agregado como estimada.
    #[must_use]
    pub fn is_estimate(&self) -> bool {
        matches!(self.provenance, PopulationProvenance::Estimate)
    }
}

/// VMT anual de un condado, indexado por FIPS de 5 caracteres.
/// Se reemplaza al por mayor en cada ingesta; sin expiración.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountyVmtRecord {
    #[serde(rename = "county_fips")]
    pub county_fips: String,
    #[serde(rename = "annual_vmt")]
    pub annual_vmt: f64,
}

impl CountyVmtRecord {
    /// VMT diario: el servicio publica cifras anuales.
    #[must_use]
    pub fn daily_vmt(&self) -> f64 {
        self.annual_vmt / 365.0
    }

    /// VMT per cápita diario, el insumo del multiplicador de demanda.
    #[must_use]
    pub fn vmt_per_capita(&self, population: u64) -> Option<f64> {
        if population == 0 {
            return None;
        }
        Some(self.daily_vmt() / population as f64)
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/demographics.rs]
