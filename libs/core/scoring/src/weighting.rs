// INICIO DEL ARCHIVO [libs/core/scoring/src/weighting.rs]
/*!
 * =================================================================
 * APARATO: CHARGER WEIGHTING MODULE (V1.3)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: MASA PONDERADA DE CARGADORES POR NIVEL
 * =================================================================
 */

/// Peso de un cargador DC rápido en la masa ponderada.
pub const LEVEL_WEIGHT_DCFAST: f64 = 1.0;
/// Peso de un cargador de nivel 2.
pub const LEVEL_WEIGHT_LEVEL2: f64 = 0.7;
/// Peso de un cargador de nivel 1.
pub const LEVEL_WEIGHT_LEVEL1: f64 = 0.3;

/// Masa ponderada de cargadores de una región:
/// `1.0·dcfast + 0.7·level2 + 0.3·level1`.
///
/// Acepta tanto censos de estaciones como censos de puertos; el llamador
/// selecciona los umbrales correspondientes en el motor de preparación.
#[must_use]
pub fn weighted_charger_mass(dcfast_count: u32, level2_count: u32, level1_count: u32) -> f64 {
    f64::from(dcfast_count) * LEVEL_WEIGHT_DCFAST
        + f64::from(level2_count) * LEVEL_WEIGHT_LEVEL2
        + f64::from(level1_count) * LEVEL_WEIGHT_LEVEL1
}

// FIN DEL ARCHIVO [libs/core/scoring/src/weighting.rs]
