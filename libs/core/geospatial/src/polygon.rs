// INICIO DEL ARCHIVO [libs/core/geospatial/src/polygon.rs]
/*!
 * =================================================================
 * APARATO: POINT-IN-POLYGON MODULE (V2.0 - RAYCAST)
 * CLASIFICACIÓN: CORE COMPUTE (ESTRATO L1)
 * RESPONSABILIDAD: CONTENCIÓN DE PUNTOS EN ANILLOS GEOJSON
 *
 * # Mathematical Proof (Ray Casting):
 * Un rayo horizontal desde el punto hacia +∞ cruza la frontera del
 * polígono un número impar de veces si y sólo si el punto es interior.
 * El conteo de paridad es robusto ante anillos convexos y cóncavos;
 * los vértices se tratan con la convención semiabierta estándar para
 * no contar dos veces la arista compartida.
 * =================================================================
 */

use crate::bbox::BoundingBox;

/// Anillo en orden GeoJSON: vértices `[longitude, latitude]`.
/// El anillo puede venir cerrado (último == primero) o abierto.
pub type Ring = Vec<[f64; 2]>;

/// Pertenencia de `(latitude, longitude)` al interior del anillo por
/// conteo de paridad de cruces.
#[must_use]
pub fn point_in_ring(latitude: f64, longitude: f64, ring: &[[f64; 2]]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut is_inside = false;
    let vertex_count = ring.len();
    let mut previous_index = vertex_count - 1;

    for current_index in 0..vertex_count {
        let [current_lng, current_lat] = ring[current_index];
        let [previous_lng, previous_lat] = ring[previous_index];

        let crosses_latitude = (current_lat > latitude) != (previous_lat > latitude);
        if crosses_latitude {
            let intersection_lng = previous_lng
                + (latitude - previous_lat) / (current_lat - previous_lat)
                    * (current_lng - previous_lng);
            if longitude < intersection_lng {
                is_inside = !is_inside;
            }
        }

        previous_index = current_index;
    }

    is_inside
}

/// Caja envolvente de un anillo; None para anillos degenerados.
#[must_use]
pub fn ring_bounding_box(ring: &[[f64; 2]]) -> Option<BoundingBox> {
    BoundingBox::enclosing(ring.iter().map(|vertex| (vertex[1], vertex[0])))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cuadrado unitario centrado en el origen, orden GeoJSON [lng, lat].
    fn unit_square() -> Ring {
        vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]]
    }

    /// Anillo cóncavo en forma de L.
    fn concave_ell() -> Ring {
        vec![
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 1.0],
            [1.0, 1.0],
            [1.0, 4.0],
            [0.0, 4.0],
        ]
    }

    #[test]
    fn certify_interior_and_exterior_points() {
        let square = unit_square();
        assert!(point_in_ring(0.0, 0.0, &square));
        assert!(point_in_ring(0.9, -0.9, &square));
        assert!(!point_in_ring(1.5, 0.0, &square));
        assert!(!point_in_ring(0.0, 2.0, &square));
    }

    #[test]
    fn certify_concave_ring_cavity_is_exterior() {
        let ell = concave_ell();
        // Dentro del brazo horizontal.
        assert!(point_in_ring(0.5, 2.0, &ell));
        // Dentro del brazo vertical.
        assert!(point_in_ring(2.0, 0.5, &ell));
        // En la cavidad de la L: fuera.
        assert!(!point_in_ring(2.0, 2.0, &ell));
    }

    #[test]
    fn certify_closed_and_open_rings_agree() {
        let open_ring = unit_square();
        let mut closed_ring = unit_square();
        closed_ring.push(closed_ring[0]);

        for &(lat, lng) in &[(0.0, 0.0), (0.5, 0.5), (2.0, 0.0), (-0.99, 0.99)] {
            assert_eq!(
                point_in_ring(lat, lng, &open_ring),
                point_in_ring(lat, lng, &closed_ring),
                "parity divergence at ({lat}, {lng})"
            );
        }
    }

    #[test]
    fn certify_degenerate_ring_contains_nothing() {
        assert!(!point_in_ring(0.0, 0.0, &[[0.0, 0.0], [1.0, 1.0]]));
        assert!(!point_in_ring(0.0, 0.0, &[]));
    }

    #[test]
    fn certify_ring_bounding_box() {
        let bounding = ring_bounding_box(&concave_ell()).expect("ring has area");
        assert_eq!(bounding.min_latitude, 0.0);
        assert_eq!(bounding.max_latitude, 4.0);
        assert_eq!(bounding.min_longitude, 0.0);
        assert_eq!(bounding.max_longitude, 4.0);
    }
}
// FIN DEL ARCHIVO [libs/core/geospatial/src/polygon.rs]
