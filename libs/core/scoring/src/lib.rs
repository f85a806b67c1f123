// [libs/core/scoring/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SCORING ENGINE REGISTRY (V4.0 - PURE STRATA)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: PUNTUACIÓN DETERMINISTA DE REGIONES
 *
 * # Mathematical Proof (Determinism):
 * Todas las funciones de este estrato son puras: mismos insumos,
 * misma puntuación, sin reloj, sin I/O y sin estado compartido.
 * El motor de agregación y la ruta de lectura comparten por tanto
 * una única verdad numérica.
 * =================================================================
 */

pub mod weighting;
pub mod readiness;
pub mod opportunity;

pub use weighting::{weighted_charger_mass, LEVEL_WEIGHT_DCFAST, LEVEL_WEIGHT_LEVEL2, LEVEL_WEIGHT_LEVEL1};
pub use readiness::{readiness_score, readiness_charger_component, vmt_demand_multiplier};
pub use opportunity::{opportunity_score, need_score};
