// INICIO DEL ARCHIVO [libs/core/scoring/src/opportunity.rs]
/*!
 * =================================================================
 * APARATO: OPPORTUNITY SCORING MODULE (V3.2)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: PUNTUACIÓN DE OPORTUNIDAD Y MÉTRICA LEGADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * La oportunidad es la inversa complementaria de la preparación:
 * regiones pobladas con pocos cargadores puntúan alto. Poblaciones
 * menores a 10 000 se atenúan para no señalar despoblados.
 * =================================================================
 */

use crate::readiness::vmt_demand_multiplier;

/// Frontera de población bajo la cual la oportunidad se atenúa.
const SMALL_POPULATION_FLOOR: f64 = 10_000.0;

/// Puntuación de oportunidad en [0, 100]: dónde falta infraestructura.
///
/// `total_chargers` es el censo total de la región (sin ponderar);
/// `daily_vmt_per_capita` amplifica la oportunidad donde la demanda de
/// tráfico es alta.
#[must_use]
pub fn opportunity_score(
    total_chargers: u32,
    population: u64,
    daily_vmt_per_capita: Option<f64>,
) -> u8 {
    let population_f = population as f64;

    if population_f < SMALL_POPULATION_FLOOR {
        return ((population_f / SMALL_POPULATION_FLOOR) * 25.0)
            .min(25.0)
            .round() as u8;
    }

    let density = (f64::from(total_chargers) / population_f) * 100_000.0;
    let demand_multiplier = daily_vmt_per_capita.map_or(1.0, vmt_demand_multiplier);

    let raw = if density <= 5.0 {
        80.0 + ((population_f / 100_000.0) / 5.0 * 20.0).min(20.0)
    } else if density <= 15.0 {
        60.0 + (15.0 - density) / 10.0 * 20.0
    } else if density <= 30.0 {
        40.0 + (30.0 - density) / 15.0 * 20.0
    } else if density <= 50.0 {
        20.0 + (50.0 - density) / 20.0 * 20.0
    } else {
        (20.0 - (density - 50.0) / 10.0 * 20.0).max(0.0)
    };

    (raw * demand_multiplier).clamp(0.0, 100.0).round() as u8
}

/// Métrica heredada de necesidad, retenida por compatibilidad:
/// `population/10000 + (population/100000)·2 − chargers·5`, pinzada a [0, 100].
#[must_use]
pub fn need_score(total_chargers: u32, population: u64) -> u8 {
    let population_f = population as f64;
    let raw = population_f / 10_000.0 + (population_f / 100_000.0) * 2.0
        - f64::from(total_chargers) * 5.0;
    raw.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /**
     * CERTIFICACIÓN: Desierto de cargadores en región poblada.
     * d = 5 exacto -> 80 + (1/5)·20 = 84 con población 100 000.
     */
    #[test]
    fn certify_charger_desert_breakpoint() {
        assert_eq!(opportunity_score(5, 100_000, None), 84);
    }

    /**
     * CERTIFICACIÓN: Atenuación de despoblados (< 10 000 habitantes).
     */
    #[test]
    fn certify_small_population_attenuation() {
        assert_eq!(opportunity_score(0, 5_000, None), 13);
        assert_eq!(opportunity_score(0, 9_999, None), 25);
        // La demanda VMT no amplifica el tramo atenuado.
        assert_eq!(opportunity_score(0, 5_000, Some(100.0)), 13);
    }

    /**
     * CERTIFICACIÓN: Saturación — densidades muy altas puntúan 0.
     */
    #[test]
    fn certify_saturated_region_scores_zero() {
        // d = (200 / 100 000)·100 000 = 200 -> tramo final negativo -> 0.
        assert_eq!(opportunity_score(200, 100_000, None), 0);
    }

    /**
     * CERTIFICACIÓN: El multiplicador de demanda amplifica la oportunidad.
     * d = 10 -> 60 + (5/10)·20 = 70; con vmt 50 -> 140 -> pinzado a 100.
     */
    #[test]
    fn certify_demand_amplification_and_clamp() {
        assert_eq!(opportunity_score(10, 100_000, None), 70);
        assert_eq!(opportunity_score(10, 100_000, Some(50.0)), 100);
    }

    /**
     * CERTIFICACIÓN: Métrica legada y sus pinzas.
     */
    #[test]
    fn certify_need_score_formula() {
        // 100 000 hab, 0 cargadores: 10 + 2 - 0 = 12.
        assert_eq!(need_score(0, 100_000), 12);
        // Sobre-servida: pinzada a 0.
        assert_eq!(need_score(50, 100_000), 0);
        // Megaciudad sin servicio: pinzada a 100.
        assert_eq!(need_score(0, 2_000_000), 100);
    }

    proptest! {
        /// Rango [0,100] para todo insumo finito.
        #[test]
        fn property_opportunity_range(
            chargers in 0u32..10_000,
            population in 1u64..50_000_000,
            vmt in proptest::option::of(0.0f64..200.0),
        ) {
            prop_assert!(opportunity_score(chargers, population, vmt) <= 100);
        }

        /// Monotonía: no-creciente en cargadores a igualdad del resto.
        #[test]
        fn property_opportunity_monotone_in_chargers(
            chargers in 0u32..5_000,
            extra in 0u32..1_000,
            population in 10_000u64..10_000_000,
        ) {
            let base = opportunity_score(chargers, population, None);
            let served = opportunity_score(chargers + extra, population, None);
            prop_assert!(served <= base);
        }

        /// Rango de la métrica legada.
        #[test]
        fn property_need_score_range(
            chargers in 0u32..10_000,
            population in 0u64..50_000_000,
        ) {
            prop_assert!(need_score(chargers, population) <= 100);
        }
    }
}
// FIN DEL ARCHIVO [libs/core/scoring/src/opportunity.rs]
