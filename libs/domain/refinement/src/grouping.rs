// INICIO DEL ARCHIVO [libs/domain/refinement/src/grouping.rs]
/*!
 * =================================================================
 * APARATO: REGION TALLY MODULE (V3.1 - CENSUS FORGE CORE)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: CENSOS REGIONALES PUROS (NIVEL / CONECTOR / PUERTO)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. COUNTING LAW: Una estación cuenta una vez en su nivel; una vez
 *    por cada clase de conector que expone; sus puertos contribuyen
 *    una vez por clase expuesta y una sola vez al total.
 * 2. CENTROID: Media aritmética de coordenadas de los miembros, no el
 *    centroide del polígono ZCTA.
 * =================================================================
 */

use std::collections::{BTreeMap, BTreeSet};
use voltaic_core_scoring::weighted_charger_mass;
use voltaic_domain_models::{
    CanonicalStation, ChargerCensus, ChargerLevel, ConnectorCensus, ConnectorType, PortCensus,
    ZipKey,
};

/// Censo acumulado de una región (estado, condado o ZIP).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionTally {
    pub station_count: u32,
    pub chargers: ChargerCensus,
    pub connectors: ConnectorCensus,
    pub ports: PortCensus,
    latitude_sum: f64,
    longitude_sum: f64,
}

impl RegionTally {
    /// Absorbe una estación en el censo.
    pub fn absorb(&mut self, station: &CanonicalStation) {
        self.station_count += 1;
        self.chargers.total += 1;
        match station.level {
            ChargerLevel::DcFast => self.chargers.dcfast += 1,
            ChargerLevel::Level2 => self.chargers.level2 += 1,
            ChargerLevel::Level1 => self.chargers.level1 += 1,
        }

        // Clases únicas: el multiset de conectores puede traer duplicados,
        // pero la estación cuenta una sola vez por clase.
        let exposed_classes: BTreeSet<ConnectorType> =
            station.connectors.iter().copied().collect();
        for connector_class in exposed_classes {
            match connector_class {
                ConnectorType::Tesla => {
                    self.connectors.tesla += 1;
                    self.ports.tesla += station.num_ports;
                }
                ConnectorType::J1772Combo => {
                    self.connectors.ccs += 1;
                    self.ports.ccs += station.num_ports;
                }
                ConnectorType::J1772 => {
                    self.connectors.j1772 += 1;
                    self.ports.j1772 += station.num_ports;
                }
                ConnectorType::Chademo => {
                    self.connectors.chademo += 1;
                    self.ports.chademo += station.num_ports;
                }
                ConnectorType::Other => {}
            }
        }

        self.ports.total += station.num_ports;
        self.latitude_sum += station.latitude;
        self.longitude_sum += station.longitude;
    }

    /// Masa ponderada de cargadores: 1.0·dcfast + 0.7·level2 + 0.3·level1.
    #[must_use]
    pub fn weighted_mass(&self) -> f64 {
        weighted_charger_mass(self.chargers.dcfast, self.chargers.level2, self.chargers.level1)
    }

    /// Centroide aritmético de los miembros; None para el censo vacío.
    #[must_use]
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.station_count == 0 {
            return None;
        }
        let divisor = f64::from(self.station_count);
        Some((self.latitude_sum / divisor, self.longitude_sum / divisor))
    }
}

/// Censo de una colección de estaciones.
#[must_use]
pub fn tally_stations<'a>(stations: impl IntoIterator<Item = &'a CanonicalStation>) -> RegionTally {
    let mut tally = RegionTally::default();
    for station in stations {
        tally.absorb(station);
    }
    tally
}

/// Agrupa estaciones por estado, en orden determinista.
#[must_use]
pub fn group_by_state<'a>(
    stations: impl IntoIterator<Item = &'a CanonicalStation>,
) -> BTreeMap<String, Vec<&'a CanonicalStation>> {
    let mut groups: BTreeMap<String, Vec<&CanonicalStation>> = BTreeMap::new();
    for station in stations {
        groups.entry(station.state.clone()).or_default().push(station);
    }
    groups
}

/// Agrupa estaciones por ZIP limpio dentro de su estado. Estaciones sin
/// ZIP no participan de la resolución ZIP.
#[must_use]
pub fn group_by_zip<'a>(
    stations: impl IntoIterator<Item = &'a CanonicalStation>,
) -> BTreeMap<ZipKey, Vec<&'a CanonicalStation>> {
    let mut groups: BTreeMap<ZipKey, Vec<&CanonicalStation>> = BTreeMap::new();
    for station in stations {
        if let Some(zip) = &station.zip {
            let key = ZipKey {
                zip: zip.clone(),
                state: station.state.clone(),
            };
            groups.entry(key).or_default().push(station);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn station(
        external_id: i64,
        state: &str,
        zip: Option<&str>,
        level: ChargerLevel,
        num_ports: u32,
        connectors: Vec<ConnectorType>,
    ) -> CanonicalStation {
        CanonicalStation {
            external_id,
            name: format!("Station {external_id}"),
            latitude: 37.0 + external_id as f64,
            longitude: -120.0,
            street_address: None,
            city: None,
            state: state.to_string(),
            zip: zip.map(str::to_string),
            level,
            num_ports,
            connectors,
            network: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /**
     * CERTIFICACIÓN: Ley de conteo — niveles, clases y puertos.
     */
    #[test]
    fn certify_counting_law() {
        let members = vec![
            station(1, "CA", Some("94110"), ChargerLevel::DcFast, 8,
                vec![ConnectorType::Tesla, ConnectorType::J1772Combo]),
            station(2, "CA", Some("94110"), ChargerLevel::Level2, 4,
                vec![ConnectorType::J1772]),
            station(3, "CA", Some("94110"), ChargerLevel::Level1, 1, vec![]),
        ];

        let tally = tally_stations(&members);

        assert_eq!(tally.chargers.total, 3);
        assert_eq!(tally.chargers.dcfast, 1);
        assert_eq!(tally.chargers.level2, 1);
        assert_eq!(tally.chargers.level1, 1);

        assert_eq!(tally.connectors.tesla, 1);
        assert_eq!(tally.connectors.ccs, 1);
        assert_eq!(tally.connectors.j1772, 1);
        assert_eq!(tally.connectors.chademo, 0);

        // La estación 1 aporta sus 8 puertos a Tesla Y a CCS, pero sólo
        // 8 al total; el total es la suma simple de puertos por estación.
        assert_eq!(tally.ports.tesla, 8);
        assert_eq!(tally.ports.ccs, 8);
        assert_eq!(tally.ports.j1772, 4);
        assert_eq!(tally.ports.total, 13);

        // Invariantes universales del agregado.
        assert_eq!(
            tally.chargers.dcfast + tally.chargers.level2 + tally.chargers.level1,
            tally.chargers.total
        );
        assert!(tally.ports.total >= tally.chargers.total);

        // Masa ponderada: 1.0 + 0.7 + 0.3.
        assert!((tally.weighted_mass() - 2.0).abs() < 1e-9);
    }

    /**
     * CERTIFICACIÓN: Duplicados del multiset no duplican clases.
     */
    #[test]
    fn certify_duplicate_connectors_count_once() {
        let twin_plug = station(1, "CA", Some("94110"), ChargerLevel::Level2, 2,
            vec![ConnectorType::J1772, ConnectorType::J1772]);

        let tally = tally_stations([&twin_plug]);
        assert_eq!(tally.connectors.j1772, 1);
        assert_eq!(tally.ports.j1772, 2);
    }

    /**
     * CERTIFICACIÓN: Centroide aritmético de los miembros.
     */
    #[test]
    fn certify_arithmetic_centroid() {
        let members = vec![
            station(1, "CA", Some("94110"), ChargerLevel::Level2, 1, vec![]),
            station(3, "CA", Some("94110"), ChargerLevel::Level2, 1, vec![]),
        ];
        let tally = tally_stations(&members);
        let (centroid_latitude, centroid_longitude) = tally.centroid().expect("non-empty");
        assert!((centroid_latitude - 39.0).abs() < 1e-9);
        assert!((centroid_longitude + 120.0).abs() < 1e-9);

        assert!(RegionTally::default().centroid().is_none());
    }

    /**
     * CERTIFICACIÓN: Agrupación por ZIP ignora estaciones sin ZIP y
     * desambigua por estado.
     */
    #[test]
    fn certify_zip_grouping() {
        let members = vec![
            station(1, "CA", Some("94110"), ChargerLevel::Level2, 1, vec![]),
            station(2, "CA", None, ChargerLevel::Level2, 1, vec![]),
            station(3, "NV", Some("89109"), ChargerLevel::Level2, 1, vec![]),
        ];

        let groups = group_by_zip(&members);
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key(&ZipKey { zip: "94110".into(), state: "CA".into() }));
        assert!(groups.contains_key(&ZipKey { zip: "89109".into(), state: "NV".into() }));
    }
}
// FIN DEL ARCHIVO [libs/domain/refinement/src/grouping.rs]
