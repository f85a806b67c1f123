// INICIO DEL ARCHIVO [libs/core/geospatial/src/zip_county.rs]
/*!
 * =================================================================
 * APARATO: ZIP->COUNTY INDEX MODULE (V2.1 - FIPS SOVEREIGN)
 * CLASIFICACIÓN: CORE REFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: DERIVACIÓN ESTÁTICA ZIP -> CONDADO (FIPS)
 *
 * El centinela de cambios deriva condados afectados por dos caminos:
 * punto-en-polígono (autoridad) y este índice estático (contraste).
 * La derivación usa FIPS completo; el proxy grosero de prefijo de dos
 * caracteres queda proscrito.
 * =================================================================
 */

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Variable de entorno que sustituye el índice embebido.
pub const ZIP_COUNTY_INDEX_PATH_VAR: &str = "ZIP_COUNTY_INDEX_PATH";

const EMBEDDED_INDEX_JSON: &str = include_str!("../data/zip_county_index.json");

/// Catálogo de fallos de hidratación del índice.
#[derive(Error, Debug)]
pub enum ZipIndexError {
    #[error("[L1_ZIP_INDEX_FAULT]: FIXTURE_IO_SEVERED -> {0}")]
    Io(#[from] std::io::Error),
    #[error("[L1_ZIP_INDEX_FAULT]: FIXTURE_SCHEMA_DRIFT -> {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Entrada del índice: un ZIP de 5 dígitos y su condado por FIPS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZipCountyEntry {
    pub zip: String,
    pub county_fips: String,
    pub state: String,
    pub county_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ZipCountyFixture {
    entries: Vec<ZipCountyEntry>,
}

/// Índice ZIP -> condado con búsqueda O(1).
#[derive(Debug, Clone)]
pub struct ZipCountyIndex {
    by_zip: HashMap<String, ZipCountyEntry>,
}

static EMBEDDED_INDEX: Lazy<ZipCountyIndex> = Lazy::new(|| {
    ZipCountyIndex::from_json_str(EMBEDDED_INDEX_JSON)
        .expect("FATAL_FIXTURE: embedded zip-county index is malformed")
});

impl ZipCountyIndex {
    /// Decodifica el índice desde JSON.
    pub fn from_json_str(json_payload: &str) -> Result<Self, ZipIndexError> {
        let fixture: ZipCountyFixture = serde_json::from_str(json_payload)?;
        let by_zip = fixture
            .entries
            .into_iter()
            .map(|entry| (entry.zip.clone(), entry))
            .collect();
        Ok(Self { by_zip })
    }

    /// Índice embebido, hidratado una sola vez por proceso.
    #[must_use]
    pub fn embedded() -> &'static ZipCountyIndex {
        &EMBEDDED_INDEX
    }

    /// Carga el índice efectivo: ZIP_COUNTY_INDEX_PATH si está definida,
    /// el fixture embebido en caso contrario.
    pub fn load() -> Result<ZipCountyIndex, ZipIndexError> {
        match std::env::var(ZIP_COUNTY_INDEX_PATH_VAR) {
            Ok(fixture_path) if !fixture_path.trim().is_empty() => {
                let file_content = std::fs::read_to_string(fixture_path)?;
                ZipCountyIndex::from_json_str(&file_content)
            }
            _ => Ok(ZipCountyIndex::embedded().clone()),
        }
    }

    /// Condado (por FIPS) de un ZIP de 5 dígitos, si el índice lo conoce.
    #[must_use]
    pub fn lookup(&self, zip_code: &str) -> Option<&ZipCountyEntry> {
        self.by_zip.get(zip_code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_zip.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_zip.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_embedded_index_lookups() {
        let index = ZipCountyIndex::embedded();
        assert!(!index.is_empty());

        let mission = index.lookup("94110").expect("94110 must be indexed");
        assert_eq!(mission.county_fips, "06075");
        assert_eq!(mission.state, "CA");

        let strip = index.lookup("89109").expect("89109 must be indexed");
        assert_eq!(strip.county_fips, "32003");

        assert!(index.lookup("00000").is_none());
    }

    #[test]
    fn certify_every_entry_carries_full_fips() {
        let index = ZipCountyIndex::embedded();
        for entry in index.by_zip.values() {
            assert_eq!(entry.county_fips.len(), 5, "bad fips for zip {}", entry.zip);
            assert_eq!(entry.zip.len(), 5, "bad zip key {}", entry.zip);
        }
    }
}
// FIN DEL ARCHIVO [libs/core/geospatial/src/zip_county.rs]
