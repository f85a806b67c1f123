// INICIO DEL ARCHIVO [libs/domain/refinement/src/normalizer.rs]
/*!
 * =================================================================
 * APARATO: STATION REFINERY MODULE (V3.3 - BOUNDARY GUARD)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TRANSMUTACIÓN REGISTRO CRUDO -> ESTACIÓN CANÓNICA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BOUNDARY PURITY: El registro crudo jamás cruza hacia los estratos
 *    internos; se refina o se rechaza aquí, con razón catalogada.
 * 2. REJECT OVER COERCE: Violaciones de la envolvente US se rechazan,
 *    nunca se corrigen por aproximación.
 * 3. DETERMINISM: Función pura; mismos insumos, misma estación.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use voltaic_domain_models::station::{US_LATITUDE_RANGE, US_LONGITUDE_RANGE};
use voltaic_domain_models::{
    CanonicalStation, ChargerLevel, ConnectorType, RawFuelStationRecord, RejectionReason,
};

/// Limpia un ZIP crudo: los primeros 5 caracteres tras el recorte,
/// siempre que sean todos dígitos. Un ZIP+4 ("12345-6789") se trunca a
/// "12345"; cualquier prefijo no numérico deja el campo ausente.
#[must_use]
pub fn clean_zip(raw_zip: Option<&str>) -> Option<String> {
    let trimmed = raw_zip?.trim();
    let prefix = trimmed.get(..5)?;
    if prefix.chars().all(|character| character.is_ascii_digit()) {
        Some(prefix.to_string())
    } else {
        None
    }
}

/// Clasifica el nivel de mayor capacidad del registro y sus puertos.
///
/// `dcfast` si el registro reporta puertos DC > 0 O su set de conectores
/// contiene J1772COMBO, CHADEMO o TESLA; si no, `level2` con puertos L2
/// > 0; `level1` en el resto. Los puertos del nivel elegido se pinzan a
/// un mínimo de 1.
#[must_use]
pub fn classify_level(record: &RawFuelStationRecord) -> (ChargerLevel, u32) {
    let connectors = decode_connectors(record);

    let dc_fast_ports = record.ev_dc_fast_num.unwrap_or(0).max(0);
    let level2_ports = record.ev_level2_evse_num.unwrap_or(0).max(0);
    let level1_ports = record.ev_level1_evse_num.unwrap_or(0).max(0);

    let has_dc_capable_connector = connectors
        .iter()
        .any(|connector| connector.implies_dc_fast());

    let (level, raw_port_count) = if dc_fast_ports > 0 || has_dc_capable_connector {
        (ChargerLevel::DcFast, dc_fast_ports)
    } else if level2_ports > 0 {
        (ChargerLevel::Level2, level2_ports)
    } else {
        (ChargerLevel::Level1, level1_ports)
    };

    (level, raw_port_count.max(1) as u32)
}

/// Decodifica el multiset de conectores preservando duplicados.
fn decode_connectors(record: &RawFuelStationRecord) -> Vec<ConnectorType> {
    record
        .ev_connector_types
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|label| ConnectorType::from_upstream_label(label))
        .collect()
}

/// Refina un registro crudo del registro federal en la estación canónica.
///
/// Orden de guardias: coordenadas ausentes, nombre ausente, envolvente
/// US. Un estado irreconocible también es un fallo de envolvente: la
/// estación no puede situarse en el territorio operativo.
pub fn normalize_station(
    record: &RawFuelStationRecord,
    observed_at: DateTime<Utc>,
) -> Result<CanonicalStation, RejectionReason> {
    let (latitude, longitude) = match (record.latitude, record.longitude) {
        (Some(latitude), Some(longitude)) => (latitude, longitude),
        _ => return Err(RejectionReason::MissingCoordinates),
    };

    let name = record
        .station_name
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or(RejectionReason::MissingName)?;

    if !(US_LATITUDE_RANGE.0..=US_LATITUDE_RANGE.1).contains(&latitude)
        || !(US_LONGITUDE_RANGE.0..=US_LONGITUDE_RANGE.1).contains(&longitude)
    {
        return Err(RejectionReason::OutsideUsEnvelope);
    }

    let state = record
        .state
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_ascii_uppercase)
        .ok_or(RejectionReason::OutsideUsEnvelope)?;

    let (level, num_ports) = classify_level(record);
    let mut connectors = decode_connectors(record);
    connectors.sort();

    Ok(CanonicalStation {
        external_id: record.id,
        name: name.to_string(),
        latitude,
        longitude,
        street_address: record.street_address.clone().filter(|s| !s.trim().is_empty()),
        city: record.city.clone().filter(|s| !s.trim().is_empty()),
        state,
        zip: clean_zip(record.zip.as_deref()),
        level,
        num_ports,
        connectors,
        network: record.ev_network.clone().filter(|s| !s.trim().is_empty()),
        created_at: observed_at,
    })
}

// FIN DEL ARCHIVO [libs/domain/refinement/src/normalizer.rs]
