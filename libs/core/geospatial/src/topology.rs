// INICIO DEL ARCHIVO [libs/core/geospatial/src/topology.rs]
/*!
 * =================================================================
 * APARATO: COUNTY TOPOLOGY MODULE (V2.5 - FIXTURE SOVEREIGN)
 * CLASIFICACIÓN: CORE REFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: CARGA Y CONSULTA DE POLÍGONOS DE CONDADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FIXTURE EMBEDDING: La topología de la huella operativa viaja
 *    embebida en el binario; un despliegue completo la sustituye vía
 *    COUNTY_TOPOLOGY_PATH sin recompilar.
 * 2. FIPS AUTHORITY: La identidad de un condado es su FIPS de 5
 *    caracteres; condados homónimos dentro de un estado jamás
 *    colisionan.
 * =================================================================
 */

use crate::bbox::BoundingBox;
use crate::polygon::{point_in_ring, ring_bounding_box, Ring};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Variable de entorno que sustituye el fixture embebido.
pub const COUNTY_TOPOLOGY_PATH_VAR: &str = "COUNTY_TOPOLOGY_PATH";

/// Fixture embebido con la huella operativa del atlas.
const EMBEDDED_TOPOLOGY_JSON: &str = include_str!("../data/county_topology.json");

/// Catálogo de fallos de hidratación de la topología.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("[L1_TOPOLOGY_FAULT]: FIXTURE_IO_SEVERED -> {0}")]
    Io(#[from] std::io::Error),
    #[error("[L1_TOPOLOGY_FAULT]: FIXTURE_SCHEMA_DRIFT -> {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Polígono de un condado. Los anillos van en orden GeoJSON [lng, lat];
/// sólo anillos exteriores (los condados con huecos no existen en la
/// huella operativa).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountyShape {
    /// FIPS completo: 2 dígitos de estado + 3 de condado.
    pub county_fips: String,
    /// Código postal del estado contenedor.
    pub state: String,
    /// Nombre visible del condado.
    pub name: String,
    pub rings: Vec<Ring>,
}

impl CountyShape {
    /// Caja envolvente de todos los anillos del condado.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut rings_iterator = self.rings.iter().filter_map(|ring| ring_bounding_box(ring));
        let first = rings_iterator.next()?;
        Some(rings_iterator.fold(first, |accumulated, next| BoundingBox {
            min_latitude: accumulated.min_latitude.min(next.min_latitude),
            max_latitude: accumulated.max_latitude.max(next.max_latitude),
            min_longitude: accumulated.min_longitude.min(next.min_longitude),
            max_longitude: accumulated.max_longitude.max(next.max_longitude),
        }))
    }

    /// Contención por refinado punto-en-polígono sobre cualquier anillo.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.rings
            .iter()
            .any(|ring| point_in_ring(latitude, longitude, ring))
    }
}

/// Topología completa de condados de la huella operativa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountyTopology {
    pub counties: Vec<CountyShape>,
}

static EMBEDDED_TOPOLOGY: Lazy<CountyTopology> = Lazy::new(|| {
    CountyTopology::from_json_str(EMBEDDED_TOPOLOGY_JSON)
        .expect("FATAL_FIXTURE: embedded county topology is malformed")
});

impl CountyTopology {
    /// Decodifica una topología desde JSON.
    pub fn from_json_str(json_payload: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json_payload)?)
    }

    /// Topología embebida, hidratada una sola vez por proceso.
    #[must_use]
    pub fn embedded() -> &'static CountyTopology {
        &EMBEDDED_TOPOLOGY
    }

    /// Carga la topología efectiva: COUNTY_TOPOLOGY_PATH si está
    /// definida, el fixture embebido en caso contrario.
    pub fn load() -> Result<CountyTopology, TopologyError> {
        match std::env::var(COUNTY_TOPOLOGY_PATH_VAR) {
            Ok(fixture_path) if !fixture_path.trim().is_empty() => {
                let file_content = std::fs::read_to_string(fixture_path)?;
                CountyTopology::from_json_str(&file_content)
            }
            _ => Ok(CountyTopology::embedded().clone()),
        }
    }

    #[must_use]
    pub fn counties(&self) -> &[CountyShape] {
        &self.counties
    }

    /// Condados de un estado dado.
    pub fn counties_for_state<'a>(
        &'a self,
        state_code: &'a str,
    ) -> impl Iterator<Item = &'a CountyShape> + 'a {
        self.counties
            .iter()
            .filter(move |shape| shape.state == state_code)
    }

    /// Búsqueda por autoridad de identidad (FIPS de 5 caracteres).
    #[must_use]
    pub fn by_fips(&self, county_fips: &str) -> Option<&CountyShape> {
        self.counties
            .iter()
            .find(|shape| shape.county_fips == county_fips)
    }

    /// Primer condado cuyo polígono contiene el punto.
    #[must_use]
    pub fn county_containing(&self, latitude: f64, longitude: f64) -> Option<&CountyShape> {
        self.counties
            .iter()
            .find(|shape| shape.contains(latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn certify_embedded_fixture_hydrates() {
        let topology = CountyTopology::embedded();
        assert!(!topology.counties().is_empty());

        // Toda entrada debe portar FIPS de 5 caracteres y anillos con área.
        for shape in topology.counties() {
            assert_eq!(shape.county_fips.len(), 5, "bad fips: {}", shape.county_fips);
            assert!(shape.bounding_box().is_some(), "ringless county: {}", shape.name);
        }
    }

    #[test]
    fn certify_known_point_containment() {
        let topology = CountyTopology::embedded();

        let mission_district = topology
            .county_containing(37.75, -122.41)
            .expect("San Francisco must cover the Mission District");
        assert_eq!(mission_district.county_fips, "06075");

        let las_vegas_strip = topology
            .county_containing(36.11, -115.17)
            .expect("Clark County must cover the Strip");
        assert_eq!(las_vegas_strip.county_fips, "32003");

        // Océano Pacífico: fuera de toda huella.
        assert!(topology.county_containing(30.0, -140.0).is_none());
    }

    #[test]
    fn certify_state_filter_and_fips_lookup() {
        let topology = CountyTopology::embedded();

        let california: Vec<_> = topology.counties_for_state("CA").collect();
        assert!(california.len() >= 2);
        assert!(california.iter().all(|shape| shape.state == "CA"));

        assert_eq!(topology.by_fips("53033").map(|s| s.name.as_str()), Some("King"));
        assert!(topology.by_fips("99999").is_none());
    }

    #[test]
    fn certify_path_override_supersedes_embedded() {
        let custom_fixture = r#"{
            "counties": [{
                "county_fips": "06075",
                "state": "CA",
                "name": "San Francisco",
                "rings": [[[-122.52, 37.70], [-122.35, 37.70], [-122.35, 37.83], [-122.52, 37.83]]]
            }]
        }"#;

        let mut fixture_file = tempfile::NamedTempFile::new().expect("tempfile");
        fixture_file
            .write_all(custom_fixture.as_bytes())
            .expect("write fixture");

        std::env::set_var(COUNTY_TOPOLOGY_PATH_VAR, fixture_file.path());
        let loaded = CountyTopology::load().expect("override must hydrate");
        std::env::remove_var(COUNTY_TOPOLOGY_PATH_VAR);

        assert_eq!(loaded.counties().len(), 1);
        assert_eq!(loaded.counties()[0].county_fips, "06075");
    }
}
// FIN DEL ARCHIVO [libs/core/geospatial/src/topology.rs]
