// [libs/domain/refinement/src/lib.rs]
/*!
 * =================================================================
 * APARATO: REFINEMENT DOMAIN REGISTRY (V3.0 - PURE PIPELINE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TRANSFORMACIONES PURAS DEL PIPELINE DE REFRESCO
 *
 * Este estrato no toca red ni disco: recibe registros y conjuntos,
 * devuelve estaciones canónicas, diffs y censos. Los servicios del
 * orquestador le inyectan el I/O.
 * =================================================================
 */

pub mod normalizer;
pub mod diff;
pub mod grouping;

pub use normalizer::{clean_zip, classify_level, normalize_station};
pub use diff::{
    diff_station_sets, stations_materially_differ, affected_regions_of,
    COORDINATE_DRIFT_TOLERANCE_DEGREES,
};
pub use grouping::{group_by_state, group_by_zip, tally_stations, RegionTally};
