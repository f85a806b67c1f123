// INICIO DEL ARCHIVO [libs/domain/refinement/src/diff.rs]
/*!
 * =================================================================
 * APARATO: STATION SET DIFF MODULE (V2.6 - SENTINEL CORE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DIFF PURO STAGING VS SERVING POR IDENTIFICADOR
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SYMMETRY LAW: added(Diff(A,B)) == removed(Diff(B,A)) por
 *    construcción; la propiedad se certifica en el Proving Grounds.
 * 2. DRIFT TOLERANCE: Desplazamientos de coordenadas <= 0.001° son
 *    ruido de geocodificación, no mudanzas.
 * =================================================================
 */

use std::collections::{BTreeSet, HashMap};
use voltaic_domain_models::{CanonicalStation, ModifiedStationPair, StationDiff, ZipKey};

/// Umbral de deriva de coordenadas que constituye una modificación real.
pub const COORDINATE_DRIFT_TOLERANCE_DEGREES: f64 = 0.001;

/// Determina si dos versiones de la misma estación difieren de forma
/// material: nivel, multiset de conectores, coordenadas (> 0.001°),
/// estado o ZIP.
#[must_use]
pub fn stations_materially_differ(current: &CanonicalStation, previous: &CanonicalStation) -> bool {
    if current.level != previous.level {
        return true;
    }
    if !current.connectors_equal(previous) {
        return true;
    }
    if (current.latitude - previous.latitude).abs() > COORDINATE_DRIFT_TOLERANCE_DEGREES
        || (current.longitude - previous.longitude).abs() > COORDINATE_DRIFT_TOLERANCE_DEGREES
    {
        return true;
    }
    if current.state != previous.state || current.zip != previous.zip {
        return true;
    }
    false
}

/// Diff puro de dos conjuntos de estaciones indexados por identificador
/// externo. `staging` es el censo recién ingerido, `serving` el que
/// atiende consultas. Los vectores resultantes se ordenan por
/// identificador para que el manifiesto sea determinista.
#[must_use]
pub fn diff_station_sets(
    staging: &HashMap<i64, CanonicalStation>,
    serving: &HashMap<i64, CanonicalStation>,
) -> StationDiff {
    let mut diff = StationDiff::default();

    for (external_id, staged_station) in staging {
        match serving.get(external_id) {
            None => diff.added.push(staged_station.clone()),
            Some(serving_station) => {
                if stations_materially_differ(staged_station, serving_station) {
                    diff.modified.push(ModifiedStationPair {
                        current: staged_station.clone(),
                        previous: serving_station.clone(),
                    });
                }
            }
        }
    }

    for (external_id, serving_station) in serving {
        if !staging.contains_key(external_id) {
            diff.removed.push(serving_station.clone());
        }
    }

    diff.added.sort_by_key(|station| station.external_id);
    diff.removed.sort_by_key(|station| station.external_id);
    diff.modified.sort_by_key(|pair| pair.current.external_id);

    diff
}

/// Deriva los estados y ZIPs afectados por un diff. Cada delta aporta
/// su `(state, ZIP?)`; una mudanza aporta además la región previa.
#[must_use]
pub fn affected_regions_of(diff: &StationDiff) -> (BTreeSet<String>, BTreeSet<ZipKey>) {
    let mut affected_states = BTreeSet::new();
    let mut affected_zips = BTreeSet::new();

    let mut absorb = |station: &CanonicalStation| {
        affected_states.insert(station.state.clone());
        if let Some(zip) = &station.zip {
            affected_zips.insert(ZipKey {
                zip: zip.clone(),
                state: station.state.clone(),
            });
        }
    };

    for station in &diff.added {
        absorb(station);
    }
    for station in &diff.removed {
        absorb(station);
    }
    for pair in &diff.modified {
        absorb(&pair.current);
        absorb(&pair.previous);
    }

    (affected_states, affected_zips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use voltaic_domain_models::{ChargerLevel, ConnectorType};

    fn station(external_id: i64, state: &str, zip: &str, latitude: f64) -> CanonicalStation {
        CanonicalStation {
            external_id,
            name: format!("Station {external_id}"),
            latitude,
            longitude: -110.0,
            street_address: None,
            city: None,
            state: state.to_string(),
            zip: Some(zip.to_string()),
            level: ChargerLevel::Level2,
            num_ports: 2,
            connectors: vec![ConnectorType::J1772],
            network: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn index(stations: Vec<CanonicalStation>) -> HashMap<i64, CanonicalStation> {
        stations
            .into_iter()
            .map(|station| (station.external_id, station))
            .collect()
    }

    /**
     * CERTIFICACIÓN: Clasificación de deltas añadido / quitado / mutado.
     */
    #[test]
    fn certify_delta_classification() {
        let staging = index(vec![
            station(1, "CA", "94110", 37.75),
            station(3, "WA", "98101", 47.60),
        ]);
        let serving = index(vec![
            station(1, "CA", "94110", 37.75),
            station(2, "NV", "89109", 36.11),
        ]);

        let diff = diff_station_sets(&staging, &serving);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].external_id, 3);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].external_id, 2);
        assert!(diff.modified.is_empty());
    }

    /**
     * CERTIFICACIÓN: La deriva de coordenadas respeta la tolerancia.
     */
    #[test]
    fn certify_coordinate_drift_tolerance() {
        let anchored = station(1, "CA", "94110", 37.7500);
        let mut nudged = anchored.clone();
        nudged.latitude += 0.0009;
        assert!(!stations_materially_differ(&nudged, &anchored));

        nudged.latitude = anchored.latitude + 0.0011;
        assert!(stations_materially_differ(&nudged, &anchored));
    }

    /**
     * CERTIFICACIÓN: El multiset de conectores compara por contenido,
     * con duplicados y sin sensibilidad al orden.
     */
    #[test]
    fn certify_connector_multiset_comparison() {
        let base = station(1, "CA", "94110", 37.75);

        let mut reordered = base.clone();
        reordered.connectors = vec![ConnectorType::J1772];
        assert!(!stations_materially_differ(&reordered, &base));

        let mut duplicated = base.clone();
        duplicated.connectors = vec![ConnectorType::J1772, ConnectorType::J1772];
        assert!(stations_materially_differ(&duplicated, &base));

        let mut upgraded = base.clone();
        upgraded.connectors = vec![ConnectorType::J1772, ConnectorType::J1772Combo];
        assert!(stations_materially_differ(&upgraded, &base));
    }

    /**
     * CERTIFICACIÓN: Una mudanza marca la región de origen y la de
     * destino como afectadas.
     */
    #[test]
    fn certify_relocation_affects_both_regions() {
        let staging = index(vec![station(1, "NV", "89109", 36.11)]);
        let serving = index(vec![station(1, "CA", "94110", 37.75)]);

        let diff = diff_station_sets(&staging, &serving);
        assert_eq!(diff.modified.len(), 1);

        let (states, zips) = affected_regions_of(&diff);
        assert!(states.contains("CA"));
        assert!(states.contains("NV"));
        assert!(zips.contains(&ZipKey { zip: "94110".to_string(), state: "CA".to_string() }));
        assert!(zips.contains(&ZipKey { zip: "89109".to_string(), state: "NV".to_string() }));
    }

    proptest! {
        /// Simetría: added(Diff(A,B)) == removed(Diff(B,A)) y viceversa.
        #[test]
        fn property_diff_symmetry(
            left_ids in proptest::collection::btree_set(0i64..40, 0..12),
            right_ids in proptest::collection::btree_set(0i64..40, 0..12),
        ) {
            let left = index(left_ids.iter().map(|&id| station(id, "CA", "94110", 37.75)).collect());
            let right = index(right_ids.iter().map(|&id| station(id, "CA", "94110", 37.75)).collect());

            let forward = diff_station_sets(&left, &right);
            let backward = diff_station_sets(&right, &left);

            let forward_added: Vec<i64> = forward.added.iter().map(|s| s.external_id).collect();
            let backward_removed: Vec<i64> = backward.removed.iter().map(|s| s.external_id).collect();
            prop_assert_eq!(forward_added, backward_removed);

            let forward_removed: Vec<i64> = forward.removed.iter().map(|s| s.external_id).collect();
            let backward_added: Vec<i64> = backward.added.iter().map(|s| s.external_id).collect();
            prop_assert_eq!(forward_removed, backward_added);

            // Conjuntos idénticos: diff vacío en ambos sentidos.
            if left_ids == right_ids {
                prop_assert!(forward.is_empty());
                prop_assert!(backward.is_empty());
            }
        }
    }
}
// FIN DEL ARCHIVO [libs/domain/refinement/src/diff.rs]
