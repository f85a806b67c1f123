// INICIO DEL ARCHIVO [libs/domain/models-rs/src/station.rs]
/*!
 * =================================================================
 * APARATO: STATION DOMAIN MODEL (V3.1 - CANONICAL SEAL)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO CANÓNICO DE ESTACIONES DE CARGA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BOUNDARY PURITY: El registro crudo del upstream (RawFuelStationRecord)
 *    jamás cruza el estrato L2; el refinador lo transmuta en
 *    CanonicalStation en la frontera de ingesta.
 * 2. NOMINAL TAXONOMY: Niveles de carga y conectores como enums
 *    tipados, nunca strings sueltos.
 * 3. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Envolvente de coordenadas del territorio operativo (EE.UU. continental + AK/HI).
pub const US_LATITUDE_RANGE: (f64, f64) = (24.5, 71.5);
/// Rango de longitud aceptado por el refinador de estaciones.
pub const US_LONGITUDE_RANGE: (f64, f64) = (-179.0, -66.0);

/// Clasificación de potencia de una estación de carga.
/// El orden de capacidad es estricto: DcFast > Level2 > Level1.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargerLevel {
    Level1,
    Level2,
    #[serde(rename = "dcfast")]
    DcFast,
}

impl ChargerLevel {
    /// Etiqueta persistida en las tablas de agregados.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            ChargerLevel::Level1 => "level1",
            ChargerLevel::Level2 => "level2",
            ChargerLevel::DcFast => "dcfast",
        }
    }

    /// Reconstruye el nivel desde la etiqueta persistida.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "level1" => Some(ChargerLevel::Level1),
            "level2" => Some(ChargerLevel::Level2),
            "dcfast" => Some(ChargerLevel::DcFast),
            _ => None,
        }
    }
}

/// Tipos de conector expuestos por una estación. Una estación puede
/// exponer varios simultáneamente (multiset en el registro crudo).
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[serde(rename = "TESLA")]
    Tesla,
    #[serde(rename = "J1772")]
    J1772,
    /// CCS (Combined Charging System) en la nomenclatura del upstream.
    #[serde(rename = "J1772COMBO")]
    J1772Combo,
    #[serde(rename = "CHADEMO")]
    Chademo,
    #[serde(rename = "OTHER")]
    Other,
}

impl ConnectorType {
    /// Decodifica la cadena del registro federal. Valores no reconocidos
    /// degradan a `Other` en vez de rechazar el registro completo.
    #[must_use]
    pub fn from_upstream_label(raw_label: &str) -> Self {
        match raw_label.trim().to_ascii_uppercase().as_str() {
            "TESLA" | "NACS" => ConnectorType::Tesla,
            "J1772" => ConnectorType::J1772,
            "J1772COMBO" | "CCS" => ConnectorType::J1772Combo,
            "CHADEMO" => ConnectorType::Chademo,
            _ => ConnectorType::Other,
        }
    }

    /// Indica si el conector implica capacidad de carga rápida DC.
    #[must_use]
    pub fn implies_dc_fast(&self) -> bool {
        matches!(
            self,
            ConnectorType::Tesla | ConnectorType::J1772Combo | ConnectorType::Chademo
        )
    }
}

/// Registro crudo tal como lo emite el registro federal de estaciones.
/// Todos los campos son opcionales: el upstream presenta deriva de esquema
/// y registros incompletos; el refinador decide qué sobrevive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFuelStationRecord {
    pub id: i64,
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub ev_connector_types: Option<Vec<String>>,
    #[serde(default)]
    pub ev_dc_fast_num: Option<i64>,
    #[serde(default)]
    pub ev_level2_evse_num: Option<i64>,
    #[serde(default)]
    pub ev_level1_evse_num: Option<i64>,
    #[serde(default)]
    pub ev_network: Option<String>,
}

/// Motivos de rechazo del refinador. Se cuentan y se registran,
/// nunca abortan el ciclo de ingesta.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    MissingCoordinates,
    MissingName,
    OutsideUsEnvelope,
}

/// Estación canónica: la única representación que circula por los
/// estratos internos. Inmutable tras su creación; un refresco con el
/// mismo identificador externo la reemplaza por completo.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStation {
    #[serde(rename = "external_identifier")]
    #[typeshare(serialized_as = "number")]
    pub external_id: i64,

    #[serde(rename = "display_name")]
    pub name: String,

    /// Grados decimales WGS84. Invariante: dentro de la envolvente US.
    pub latitude: f64,
    pub longitude: f64,

    #[serde(rename = "street_address", skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Código postal de dos letras del estado.
    #[serde(rename = "state_code")]
    pub state: String,

    /// ZIP de 5 dígitos numéricos, o ausente. Un ZIP+4 se trunca a 5.
    #[serde(rename = "zip_code", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    /// Nivel de mayor capacidad presente en el registro crudo.
    #[serde(rename = "charger_level")]
    pub level: ChargerLevel,

    /// Puertos del nivel elegido. Invariante: >= 1.
    #[serde(rename = "port_count")]
    pub num_ports: u32,

    /// Multiset de conectores, ordenado para comparación determinista.
    #[serde(rename = "connector_types")]
    pub connectors: Vec<ConnectorType>,

    #[serde(rename = "network_label", skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    #[serde(rename = "created_at_timestamp")]
    #[typeshare(serialized_as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CanonicalStation {
    /// Compara los multisets de conectores de forma insensible al orden.
    #[must_use]
    pub fn connectors_equal(&self, other: &CanonicalStation) -> bool {
        let mut mine = self.connectors.clone();
        let mut theirs = other.connectors.clone();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/station.rs]
