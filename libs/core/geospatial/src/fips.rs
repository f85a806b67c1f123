// INICIO DEL ARCHIVO [libs/core/geospatial/src/fips.rs]
/*!
 * =================================================================
 * APARATO: FIPS REFERENCE TABLES (V1.4)
 * CLASIFICACIÓN: CORE REFERENCE (ESTRATO L1)
 * RESPONSABILIDAD: CORRESPONDENCIA POSTAL <-> FIPS DE ESTADOS
 *
 * Fuente: FIPS 5-2 / Census Bureau. 50 estados + Distrito de Columbia.
 * Los territorios no forman parte del territorio operativo del atlas.
 * =================================================================
 */

/// Tabla soberana `(postal, fips_2_dígitos, nombre)`.
const STATE_FIPS_TABLE: &[(&str, &str, &str)] = &[
    ("AL", "01", "Alabama"),
    ("AK", "02", "Alaska"),
    ("AZ", "04", "Arizona"),
    ("AR", "05", "Arkansas"),
    ("CA", "06", "California"),
    ("CO", "08", "Colorado"),
    ("CT", "09", "Connecticut"),
    ("DE", "10", "Delaware"),
    ("DC", "11", "District of Columbia"),
    ("FL", "12", "Florida"),
    ("GA", "13", "Georgia"),
    ("HI", "15", "Hawaii"),
    ("ID", "16", "Idaho"),
    ("IL", "17", "Illinois"),
    ("IN", "18", "Indiana"),
    ("IA", "19", "Iowa"),
    ("KS", "20", "Kansas"),
    ("KY", "21", "Kentucky"),
    ("LA", "22", "Louisiana"),
    ("ME", "23", "Maine"),
    ("MD", "24", "Maryland"),
    ("MA", "25", "Massachusetts"),
    ("MI", "26", "Michigan"),
    ("MN", "27", "Minnesota"),
    ("MS", "28", "Mississippi"),
    ("MO", "29", "Missouri"),
    ("MT", "30", "Montana"),
    ("NE", "31", "Nebraska"),
    ("NV", "32", "Nevada"),
    ("NH", "33", "New Hampshire"),
    ("NJ", "34", "New Jersey"),
    ("NM", "35", "New Mexico"),
    ("NY", "36", "New York"),
    ("NC", "37", "North Carolina"),
    ("ND", "38", "North Dakota"),
    ("OH", "39", "Ohio"),
    ("OK", "40", "Oklahoma"),
    ("OR", "41", "Oregon"),
    ("PA", "42", "Pennsylvania"),
    ("RI", "44", "Rhode Island"),
    ("SC", "45", "South Carolina"),
    ("SD", "46", "South Dakota"),
    ("TN", "47", "Tennessee"),
    ("TX", "48", "Texas"),
    ("UT", "49", "Utah"),
    ("VT", "50", "Vermont"),
    ("VA", "51", "Virginia"),
    ("WA", "53", "Washington"),
    ("WV", "54", "West Virginia"),
    ("WI", "55", "Wisconsin"),
    ("WY", "56", "Wyoming"),
];

/// FIPS de 2 dígitos para un código postal de estado (insensible a mayúsculas).
#[must_use]
pub fn fips_for_postal(postal_code: &str) -> Option<&'static str> {
    let normalized = postal_code.trim().to_ascii_uppercase();
    STATE_FIPS_TABLE
        .iter()
        .find(|(postal, _, _)| *postal == normalized)
        .map(|(_, fips, _)| *fips)
}

/// Código postal para un prefijo FIPS de 2 dígitos.
#[must_use]
pub fn postal_for_fips(fips_prefix: &str) -> Option<&'static str> {
    STATE_FIPS_TABLE
        .iter()
        .find(|(_, fips, _)| *fips == fips_prefix)
        .map(|(postal, _, _)| *postal)
}

/// Nombre visible del estado para un código postal.
#[must_use]
pub fn state_name_for_postal(postal_code: &str) -> Option<&'static str> {
    let normalized = postal_code.trim().to_ascii_uppercase();
    STATE_FIPS_TABLE
        .iter()
        .find(|(postal, _, _)| *postal == normalized)
        .map(|(_, _, name)| *name)
}

// FIN DEL ARCHIVO [libs/core/geospatial/src/fips.rs]
