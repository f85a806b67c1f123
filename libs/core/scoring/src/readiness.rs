// INICIO DEL ARCHIVO [libs/core/scoring/src/readiness.rs]
/*!
 * =================================================================
 * APARATO: READINESS SCORING MODULE (V4.1 - DUAL REGIME)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: PUNTUACIÓN DE PREPARACIÓN DE INFRAESTRUCTURA EV
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL REGIME: Sin VMT la puntuación es puramente de densidad de
 *    cargadores; con VMT se ajusta por demanda de tráfico y se mezcla
 *    una componente de densidad poblacional (0.7 / 0.3).
 * 2. COMPONENT EXPOSURE: La componente de cargadores se expone por
 *    separado; la discontinuidad en la frontera VMT-presente es una
 *    decisión de diseño registrada, no un defecto a suavizar.
 * 3. DOCUMENTED HUMP: Con VMT presente, la puntuación no es monótona
 *    en población: la componente de densidad sube hasta saturar en
 *    300 000 habitantes y luego la componente de cargadores (siempre
 *    no-creciente) queda al mando. La joroba alrededor de la
 *    saturación se certifica, no se suaviza.
 * =================================================================
 */

/// Umbrales estándar de densidad ponderada por cada 100 000 habitantes.
/// Orden estricto T1 > T2 > T3 > T4 > T5.
pub const DENSITY_THRESHOLDS: [f64; 5] = [60.0, 40.0, 25.0, 15.0, 8.0];

/// Umbrales cuando la masa ponderada se construye sobre puertos.
pub const PORT_WEIGHTED_THRESHOLDS: [f64; 5] = [200.0, 120.0, 75.0, 40.0, 20.0];

/// VMT per cápita diario considerado demanda neutral.
const NEUTRAL_DAILY_VMT: f64 = 25.0;

/// Techo de población de la componente de densidad poblacional.
const DENSITY_POPULATION_CEILING: f64 = 300_000.0;

/// Multiplicador de demanda por tráfico: `clamp(vmt / 25, 0.5, 2.0)`.
/// Una demanda mayor exige más infraestructura para la misma puntuación.
#[must_use]
pub fn vmt_demand_multiplier(daily_vmt_per_capita: f64) -> f64 {
    (daily_vmt_per_capita / NEUTRAL_DAILY_VMT).clamp(0.5, 2.0)
}

/// Evaluación por tramos de la densidad ajustada contra los umbrales.
fn piecewise_density_score(adjusted_density: f64, thresholds: &[f64; 5]) -> f64 {
    let [t1, t2, t3, t4, t5] = *thresholds;

    let raw = if adjusted_density >= t1 {
        80.0 + (((adjusted_density - t1) / (t1 * 2.0 / 3.0)) * 20.0).min(20.0)
    } else if adjusted_density >= t2 {
        70.0 + (adjusted_density - t2) / (t1 - t2) * 10.0
    } else if adjusted_density >= t3 {
        55.0 + (adjusted_density - t3) / (t2 - t3) * 15.0
    } else if adjusted_density >= t4 {
        40.0 + (adjusted_density - t4) / (t3 - t4) * 15.0
    } else if adjusted_density >= t5 {
        25.0 + (adjusted_density - t5) / (t4 - t5) * 15.0
    } else {
        (adjusted_density / t5) * 25.0
    };

    raw.clamp(0.0, 100.0)
}

/// Componente de cargadores de la puntuación de preparación, previa a la
/// mezcla con densidad poblacional. Expuesta para auditoría del régimen
/// VMT-presente.
#[must_use]
pub fn readiness_charger_component(
    weighted_mass: f64,
    population: u64,
    daily_vmt_per_capita: Option<f64>,
    port_weighted: bool,
) -> f64 {
    if population == 0 {
        return 0.0;
    }

    let density = (weighted_mass / population as f64) * 100_000.0;
    let adjusted_density = match daily_vmt_per_capita {
        Some(vmt) => density / vmt_demand_multiplier(vmt),
        None => density,
    };

    let thresholds = if port_weighted {
        &PORT_WEIGHTED_THRESHOLDS
    } else {
        &DENSITY_THRESHOLDS
    };

    piecewise_density_score(adjusted_density, thresholds)
}

/// Puntuación de preparación de infraestructura EV en [0, 100].
///
/// Con VMT presente la componente de cargadores se mezcla con una
/// componente de densidad poblacional `min(population/300000·100, 100)`
/// en proporción 0.7 / 0.3.
#[must_use]
pub fn readiness_score(
    weighted_mass: f64,
    population: u64,
    daily_vmt_per_capita: Option<f64>,
    port_weighted: bool,
) -> u8 {
    if population == 0 {
        return 0;
    }

    let charger_component =
        readiness_charger_component(weighted_mass, population, daily_vmt_per_capita, port_weighted);

    let blended = match daily_vmt_per_capita {
        Some(_) => {
            let density_component =
                ((population as f64 / DENSITY_POPULATION_CEILING) * 100.0).min(100.0);
            0.7 * charger_component + 0.3 * density_component
        }
        None => charger_component,
    };

    blended.clamp(0.0, 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /**
     * CERTIFICACIÓN: Breakpoints exactos del tramo superior.
     * population = 100 000, weighted = 60 -> d = 60 = T1 -> 80.
     */
    #[test]
    fn certify_top_threshold_breakpoint() {
        assert_eq!(readiness_score(60.0, 100_000, None, false), 80);
    }

    /**
     * CERTIFICACIÓN: Régimen VMT-presente del escenario de auditoría.
     * weighted = 60, vmt = 50 -> multiplier 2.0, d' = 30 -> componente 60;
     * mezcla final 0.7·60 + 0.3·(100/3) = 52. La discontinuidad respecto
     * de la banda [55, 70) de la componente es deliberada.
     */
    #[test]
    fn certify_vmt_adjusted_blend_exact_value() {
        let component = readiness_charger_component(60.0, 100_000, Some(50.0), false);
        assert!((component - 60.0).abs() < 1e-9);
        assert!((55.0..70.0).contains(&component));

        assert_eq!(readiness_score(60.0, 100_000, Some(50.0), false), 52);
    }

    /**
     * CERTIFICACIÓN: Continuidad en cada frontera de tramo.
     */
    #[test]
    fn certify_piecewise_continuity_at_thresholds() {
        for t in DENSITY_THRESHOLDS {
            let below = piecewise_density_score(t - 1e-9, &DENSITY_THRESHOLDS);
            let at = piecewise_density_score(t, &DENSITY_THRESHOLDS);
            assert!(
                (at - below).abs() < 1e-6,
                "discontinuity at threshold {t}: {below} vs {at}"
            );
        }
    }

    /**
     * CERTIFICACIÓN: Umbrales de puertos desplazan los breakpoints.
     * weighted(ports) = 200, population = 100 000 -> d = 200 = T1 -> 80.
     */
    #[test]
    fn certify_port_weighted_thresholds() {
        assert_eq!(readiness_score(200.0, 100_000, None, true), 80);
        // Con umbrales estándar la misma masa saturaría el tramo superior.
        assert_eq!(readiness_score(200.0, 100_000, None, false), 100);
    }

    /**
     * CERTIFICACIÓN: Desierto de cargadores puntúa 0; población nula
     * degrada a 0 sin división por cero.
     */
    #[test]
    fn certify_degenerate_inputs() {
        assert_eq!(readiness_score(0.0, 1_000_000, None, false), 0);
        assert_eq!(readiness_score(50.0, 0, None, false), 0);
        assert_eq!(readiness_score(0.0, 0, Some(30.0), false), 0);
    }

    /**
     * CERTIFICACIÓN: Multiplicador de demanda y sus pinzas.
     */
    #[test]
    fn certify_demand_multiplier_clamps() {
        assert!((vmt_demand_multiplier(25.0) - 1.0).abs() < 1e-9);
        assert!((vmt_demand_multiplier(100.0) - 2.0).abs() < 1e-9);
        assert!((vmt_demand_multiplier(1.0) - 0.5).abs() < 1e-9);
    }

    /**
     * CERTIFICACIÓN: La no-monotonía en población del régimen
     * VMT-presente es inherente a la mezcla 0.7/0.3. A masa y demanda
     * fijas (weighted = 60, vmt = 50), la traza medida es
     * 52 (100k) -> 48 (200k) -> 51 (300k) -> 46 (400k) -> 37 (1M):
     * la subida es una joroba local alrededor del techo de densidad
     * poblacional; pasado el techo, la componente de cargadores
     * (no-creciente) decide en solitario.
     */
    #[test]
    fn certify_population_hump_at_density_saturation() {
        let at_100k = readiness_score(60.0, 100_000, Some(50.0), false);
        let at_200k = readiness_score(60.0, 200_000, Some(50.0), false);
        let at_300k = readiness_score(60.0, 300_000, Some(50.0), false);
        let at_400k = readiness_score(60.0, 400_000, Some(50.0), false);
        let at_1m = readiness_score(60.0, 1_000_000, Some(50.0), false);

        assert_eq!(at_100k, 52);
        assert_eq!(at_200k, 48);
        // Joroba local: la densidad poblacional aún crece hacia su techo.
        assert!(at_300k > at_200k);
        // Saturada la densidad, manda la componente de cargadores.
        assert!(at_400k < at_300k);
        assert!(at_1m < at_400k);
    }

    proptest! {
        /// Rango: enteros en [0,100] para todo insumo finito con población >= 1.
        #[test]
        fn property_score_range(
            weighted in 0.0f64..5_000.0,
            population in 1u64..50_000_000,
            vmt in proptest::option::of(0.0f64..200.0),
            port_weighted in proptest::bool::ANY,
        ) {
            let score = readiness_score(weighted, population, vmt, port_weighted);
            prop_assert!(score <= 100);
        }

        /// Monotonía: no-decreciente en la masa ponderada a igualdad del resto.
        #[test]
        fn property_monotone_in_weighted_mass(
            weighted in 0.0f64..2_000.0,
            delta in 0.0f64..500.0,
            population in 1u64..10_000_000,
            vmt in proptest::option::of(0.0f64..200.0),
        ) {
            let base = readiness_score(weighted, population, vmt, false);
            let raised = readiness_score(weighted + delta, population, vmt, false);
            prop_assert!(raised >= base);
        }

        /// Monotonía: no-creciente en VMT (más demanda, menos preparación)
        /// a igualdad del resto de insumos.
        #[test]
        fn property_monotone_in_vmt(
            weighted in 0.0f64..2_000.0,
            population in 1u64..10_000_000,
            vmt in 0.0f64..190.0,
            delta in 0.0f64..50.0,
        ) {
            let base = readiness_score(weighted, population, Some(vmt), false);
            let heavier = readiness_score(weighted, population, Some(vmt + delta), false);
            prop_assert!(heavier <= base);
        }

        /// Monotonía: sin VMT, no-creciente en población (densidad pura).
        #[test]
        fn property_monotone_in_population_without_vmt(
            weighted in 0.0f64..2_000.0,
            population in 1u64..10_000_000,
            extra in 0u64..5_000_000,
        ) {
            let base = readiness_score(weighted, population, None, false);
            let denser = readiness_score(weighted, population + extra, None, false);
            prop_assert!(denser <= base);
        }

        /// Monotonía: la componente de cargadores es no-creciente en
        /// población para cualquier demanda VMT; es la mitad del
        /// invariante compuesto que sí rige en todo el dominio.
        #[test]
        fn property_charger_component_monotone_in_population(
            weighted in 0.0f64..2_000.0,
            population in 1u64..10_000_000,
            extra in 0u64..5_000_000,
            vmt in proptest::option::of(0.0f64..200.0),
        ) {
            let base = readiness_charger_component(weighted, population, vmt, false);
            let denser = readiness_charger_component(weighted, population + extra, vmt, false);
            prop_assert!(denser <= base + 1e-9);
        }

        /// Monotonía: con VMT presente, la puntuación mezclada sólo es
        /// no-creciente en población una vez que la componente de
        /// densidad satura (población >= 300 000); bajo el techo la
        /// mezcla produce la joroba certificada arriba.
        #[test]
        fn property_monotone_in_population_with_vmt_beyond_ceiling(
            weighted in 0.0f64..2_000.0,
            population in (DENSITY_POPULATION_CEILING as u64)..10_000_000,
            extra in 0u64..5_000_000,
            vmt in 0.0f64..200.0,
        ) {
            let base = readiness_score(weighted, population, Some(vmt), false);
            let denser = readiness_score(weighted, population + extra, Some(vmt), false);
            prop_assert!(denser <= base);
        }
    }
}
// FIN DEL ARCHIVO [libs/core/scoring/src/readiness.rs]
