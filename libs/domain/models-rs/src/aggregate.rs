// INICIO DEL ARCHIVO [libs/domain/models-rs/src/aggregate.rs]
/*!
 * =================================================================
 * APARATO: REGION AGGREGATE MODEL (V3.2 - MULTIRESOLUTION)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DE AGREGADOS ESTADO / CONDADO / ZIP
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SCHEMA UNITY: Las tres resoluciones comparten un único esquema;
 *    el discriminador es 'region_kind' + 'zoom_range'.
 * 2. INTEGRITY GATES: Totalidad de niveles y de puertos verificable
 *    antes de cualquier INSERT en staging.
 * 3. ESTIMATE AWARENESS: Poblaciones ausentes se marcan estimadas,
 *    nunca se confunden con datos censales vivos.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Resolución geográfica de una fila de agregado.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    State,
    County,
    Zip,
}

/// Franja de zoom del cliente de mapa que consume la fila.
#[typeshare]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomRange {
    StateTier,
    CountyTier,
    ZipTier,
}

impl ZoomRange {
    /// Franja canónica para cada resolución.
    #[must_use]
    pub fn for_kind(kind: RegionKind) -> Self {
        match kind {
            RegionKind::State => ZoomRange::StateTier,
            RegionKind::County => ZoomRange::CountyTier,
            RegionKind::Zip => ZoomRange::ZipTier,
        }
    }

    /// Etiqueta persistida en las tablas de agregados.
    #[must_use]
    pub fn as_label(&self) -> &'static str {
        match self {
            ZoomRange::StateTier => "state_tier",
            ZoomRange::CountyTier => "county_tier",
            ZoomRange::ZipTier => "zip_tier",
        }
    }
}

/// Censo de cargadores por nivel de potencia.
/// Invariante: dcfast + level2 + level1 = total.
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerCensus {
    #[serde(rename = "total_chargers")]
    pub total: u32,
    #[serde(rename = "dcfast_count")]
    pub dcfast: u32,
    #[serde(rename = "level2_count")]
    pub level2: u32,
    #[serde(rename = "level1_count")]
    pub level1: u32,
}

/// Censo de estaciones por clase de conector expuesto.
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorCensus {
    #[serde(rename = "tesla_count")]
    pub tesla: u32,
    #[serde(rename = "ccs_count")]
    pub ccs: u32,
    #[serde(rename = "j1772_count")]
    pub j1772: u32,
    #[serde(rename = "chademo_count")]
    pub chademo: u32,
}

/// Censo de puertos. Un puerto contribuye una vez por clase de conector
/// que la estación expone; el total es la suma simple de puertos.
/// Invariante: total >= total de cargadores de la región.
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCensus {
    #[serde(rename = "tesla_ports")]
    pub tesla: u32,
    #[serde(rename = "ccs_ports")]
    pub ccs: u32,
    #[serde(rename = "j1772_ports")]
    pub j1772: u32,
    #[serde(rename = "chademo_ports")]
    pub chademo: u32,
    #[serde(rename = "total_ports")]
    pub total: u32,
}

/// Fila de agregado multiresolución. Reescrita en staging en cada ciclo
/// para cada región afectada; promovida a serving de forma atómica.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    #[serde(rename = "region_kind")]
    pub kind: RegionKind,

    /// Código postal de dos letras del estado contenedor.
    #[serde(rename = "state_code")]
    pub state: String,

    /// Nombre visible: nombre del estado, del condado, o el código ZIP.
    #[serde(rename = "region_name")]
    pub name: String,

    /// FIPS de 5 caracteres; presente sólo en la resolución de condado.
    /// Desambigua condados homónimos dentro de un estado.
    #[serde(rename = "county_fips", skip_serializing_if = "Option::is_none")]
    pub county_fips: Option<String>,

    /// Código ZIP de 5 dígitos; presente sólo en la resolución ZIP.
    #[serde(rename = "zip_code", skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    #[serde(rename = "center_latitude")]
    pub center_latitude: f64,
    #[serde(rename = "center_longitude")]
    pub center_longitude: f64,

    #[typeshare(serialized_as = "number")]
    pub population: u64,
    #[serde(rename = "population_is_estimated")]
    pub population_is_estimated: bool,

    #[serde(rename = "charger_census")]
    pub chargers: ChargerCensus,
    #[serde(rename = "connector_census")]
    pub connectors: ConnectorCensus,
    #[serde(rename = "port_census")]
    pub ports: PortCensus,

    /// Métrica heredada, retenida por compatibilidad con el cliente.
    pub need_score: u8,
    /// Métrica principal de preparación de infraestructura [0,100].
    pub ev_infrastructure_score: u8,

    #[serde(rename = "vmt_per_capita", skip_serializing_if = "Option::is_none")]
    pub vmt_per_capita: Option<f64>,

    pub zoom_range: ZoomRange,
}

impl RegionAggregate {
    /// Verifica las invariantes estructurales de la fila antes de su
    /// cristalización en staging. Devuelve la descripción de la primera
    /// violación encontrada, o None si la fila es íntegra.
    #[must_use]
    pub fn integrity_violation(&self) -> Option<String> {
        let c = &self.chargers;
        if c.dcfast + c.level2 + c.level1 != c.total {
            return Some(format!(
                "LEVEL_TOTALITY_BREACH: {} + {} + {} != {} for region [{}/{}]",
                c.dcfast, c.level2, c.level1, c.total, self.state, self.name
            ));
        }
        if self.ports.total < c.total {
            return Some(format!(
                "PORT_TOTALITY_BREACH: total_ports {} < total_chargers {} for region [{}/{}]",
                self.ports.total, c.total, self.state, self.name
            ));
        }
        if self.ev_infrastructure_score > 100 || self.need_score > 100 {
            return Some(format!(
                "SCORE_RANGE_BREACH: scores ({}, {}) outside [0,100] for region [{}/{}]",
                self.ev_infrastructure_score, self.need_score, self.state, self.name
            ));
        }
        None
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/aggregate.rs]
