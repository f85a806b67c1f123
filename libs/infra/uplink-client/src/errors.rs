// INICIO DEL ARCHIVO [libs/infra/uplink-client/src/errors.rs]
/*!
 * =================================================================
 * APARATO: UPLINK ERROR CATALOG (V2.1)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE RED SALIENTE
 * =================================================================
 */

use thiserror::Error;

/// Catálogo de fallos del túnel saliente. Todo miembro colapsa en
/// `upstream-error` al cruzar hacia el conductor de ciclo.
#[derive(Error, Debug)]
pub enum UplinkError {
    /// Enlace físico interrumpido, DNS o timeout del túnel (5 s).
    #[error("[L4_UPLINK_FAULT]: NETWORK_TUNNEL_SEVERED -> {0}")]
    ConnectionFault(#[from] reqwest::Error),

    /// El proveedor respondió con un estado no-2xx.
    #[error("[L4_UPLINK_FAULT]: PROVIDER_REJECTION -> HTTP {status}")]
    ProviderRejection { status: u16 },

    /// El payload llegó pero su esquema presenta deriva.
    #[error("[L4_UPLINK_FAULT]: PAYLOAD_SCHEMA_DRIFT -> {0}")]
    MalformedPayload(String),
}
// FIN DEL ARCHIVO [libs/infra/uplink-client/src/errors.rs]
