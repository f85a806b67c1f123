// INICIO DEL ARCHIVO [libs/domain/models-rs/src/change.rs]
/*!
 * =================================================================
 * APARATO: CHANGE MANIFEST MODEL (V2.4 - SENTINEL CONTRACT)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: CONTRATO DEL DETECTOR DE CAMBIOS Y SU BITÁCORA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DETERMINISTIC SETS: BTreeSet para que los conjuntos afectados
 *    tengan orden total y la reanudación del conveyor ZIP sea
 *    reproducible tick a tick.
 * 2. FIPS SOVEREIGNTY: Los condados se desambiguan por FIPS, jamás
 *    por nombre.
 * =================================================================
 */

use crate::station::CanonicalStation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use typeshare::typeshare;

/// Clave de condado afectado. El orden (y la igualdad) se apoyan en el
/// FIPS de 5 caracteres; el nombre es sólo presentación.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CountyKey {
    /// FIPS completo (2 de estado + 3 de condado). Autoridad de identidad.
    pub county_fips: String,
    #[serde(rename = "state_code")]
    pub state: String,
    #[serde(rename = "county_name")]
    pub name: String,
}

/// Clave de ZIP afectado; el estado desambigua ZIPs fronterizos.
#[typeshare]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZipKey {
    #[serde(rename = "zip_code")]
    pub zip: String,
    #[serde(rename = "state_code")]
    pub state: String,
}

/// Par (actual, previa) de una estación modificada. La versión previa
/// permite marcar como afectada la región de origen de una mudanza.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifiedStationPair {
    pub current: CanonicalStation,
    pub previous: CanonicalStation,
}

/// Resultado puro del diff de conjuntos de estaciones (staging vs serving).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationDiff {
    pub added: Vec<CanonicalStation>,
    pub removed: Vec<CanonicalStation>,
    pub modified: Vec<ModifiedStationPair>,
}

impl StationDiff {
    /// Un diff sin deltas corta el ciclo en la fase de detección.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Totales post-filtro del manifiesto, persistidos en la bitácora.
#[typeshare]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTotals {
    #[serde(rename = "added_stations")]
    pub added: u32,
    #[serde(rename = "removed_stations")]
    pub removed: u32,
    #[serde(rename = "modified_stations")]
    pub modified: u32,
    #[serde(rename = "affected_state_count")]
    pub affected_states: u32,
    #[serde(rename = "affected_county_count")]
    pub affected_counties: u32,
    #[serde(rename = "affected_zip_count")]
    pub affected_zips: u32,
}

/// Manifiesto de cambios de un ciclo: los tres conjuntos afectados que
/// gobiernan la re-agregación, más los totales de auditoría.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeManifest {
    #[serde(rename = "cycle_identifier")]
    pub cycle_id: String,

    #[serde(rename = "detected_at_timestamp")]
    pub detected_at: Option<DateTime<Utc>>,

    pub affected_states: BTreeSet<String>,
    pub affected_counties: BTreeSet<CountyKey>,
    pub affected_zips: BTreeSet<ZipKey>,

    pub totals: ChangeTotals,
}

impl ChangeManifest {
    /// Manifiesto vacío: ninguna región requiere re-agregación.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affected_states.is_empty()
            && self.affected_counties.is_empty()
            && self.affected_zips.is_empty()
    }
}
// FIN DEL ARCHIVO [libs/domain/models-rs/src/change.rs]
