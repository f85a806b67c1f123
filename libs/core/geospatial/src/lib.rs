// [libs/core/geospatial/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GEOSPATIAL CORE REGISTRY (V3.0 - ATLAS STRATA)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: GEOMETRÍA PURA Y TABLAS DE REFERENCIA GEOGRÁFICA
 * =================================================================
 */

pub mod bbox;
pub mod polygon;
pub mod topology;
pub mod fips;
pub mod zip_county;
pub mod census_2020;

pub use bbox::BoundingBox;
pub use polygon::{point_in_ring, ring_bounding_box, Ring};
pub use topology::{CountyShape, CountyTopology, TopologyError};
pub use fips::{fips_for_postal, postal_for_fips, state_name_for_postal};
pub use zip_county::{ZipCountyEntry, ZipCountyIndex, ZipIndexError};
pub use census_2020::state_population_2020;
