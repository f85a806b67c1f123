// INICIO DEL ARCHIVO [libs/core/geospatial/src/bbox.rs]
/*!
 * =================================================================
 * APARATO: BOUNDING BOX MODULE (V2.2)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: CAJAS ENVOLVENTES ALINEADAS A EJES (WGS84)
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Caja envolvente alineada a ejes en grados decimales WGS84.
/// Invariante: min <= max en ambos ejes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Construye la caja envolvente mínima de una nube de puntos
    /// `(latitude, longitude)`. Devuelve None para la nube vacía.
    #[must_use]
    pub fn enclosing(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iterator = points.into_iter();
        let (first_latitude, first_longitude) = iterator.next()?;

        let mut bounding = BoundingBox {
            min_latitude: first_latitude,
            max_latitude: first_latitude,
            min_longitude: first_longitude,
            max_longitude: first_longitude,
        };

        for (latitude, longitude) in iterator {
            bounding.min_latitude = bounding.min_latitude.min(latitude);
            bounding.max_latitude = bounding.max_latitude.max(latitude);
            bounding.min_longitude = bounding.min_longitude.min(longitude);
            bounding.max_longitude = bounding.max_longitude.max(longitude);
        }

        Some(bounding)
    }

    /// Expande la caja en `buffer_degrees` por cada lado. El filtro de
    /// candidatos de condado usa 0.05° para no perder estaciones
    /// fronterizas antes del refinado punto-en-polígono.
    #[must_use]
    pub fn expanded(&self, buffer_degrees: f64) -> Self {
        BoundingBox {
            min_latitude: self.min_latitude - buffer_degrees,
            max_latitude: self.max_latitude + buffer_degrees,
            min_longitude: self.min_longitude - buffer_degrees,
            max_longitude: self.max_longitude + buffer_degrees,
        }
    }

    /// Pertenencia inclusiva en ambos bordes.
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_latitude
            && latitude <= self.max_latitude
            && longitude >= self.min_longitude
            && longitude <= self.max_longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certify_enclosing_box_of_point_cloud() {
        let cloud = [(37.75, -122.41), (36.11, -115.17), (47.60, -122.33)];
        let bounding = BoundingBox::enclosing(cloud).expect("non-empty cloud");

        assert_eq!(bounding.min_latitude, 36.11);
        assert_eq!(bounding.max_latitude, 47.60);
        assert_eq!(bounding.min_longitude, -122.41);
        assert_eq!(bounding.max_longitude, -115.17);
    }

    #[test]
    fn certify_empty_cloud_has_no_box() {
        assert!(BoundingBox::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn certify_buffer_expansion_and_containment() {
        let bounding = BoundingBox::enclosing([(37.0, -122.0)]).unwrap();
        assert!(!bounding.contains(37.04, -122.0));

        let buffered = bounding.expanded(0.05);
        assert!(buffered.contains(37.04, -122.0));
        assert!(buffered.contains(37.05, -122.05));
        assert!(!buffered.contains(37.06, -122.0));
    }
}
// FIN DEL ARCHIVO [libs/core/geospatial/src/bbox.rs]
