// INICIO DEL ARCHIVO [libs/infra/uplink-client/src/backoff.rs]
/*!
 * =================================================================
 * APARATO: BACKOFF LADDER MODULE (V1.2)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: POLÍTICA DE REINTENTOS DEL TÚNEL SALIENTE
 *
 * Contrato: 1 intento inicial + 3 reintentos con retardos 1s / 2s / 4s.
 * Tras el fallo terminal, el oráculo demográfico degrada a estimación;
 * el driver de ingesta aborta el ciclo.
 * =================================================================
 */

use crate::errors::UplinkError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Timeout de cada llamada saliente.
pub const UPLINK_TIMEOUT: Duration = Duration::from_secs(5);

/// Escalera de retardos entre reintentos.
pub const RETRY_DELAY_LADDER: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Ejecuta la operación con la escalera de reintentos soberana.
/// Devuelve el primer éxito o el último fallo tras agotar la escalera.
pub async fn retry_with_backoff<T, MakeAttempt, AttemptFuture>(
    operation_label: &str,
    mut make_attempt: MakeAttempt,
) -> Result<T, UplinkError>
where
    MakeAttempt: FnMut() -> AttemptFuture,
    AttemptFuture: Future<Output = Result<T, UplinkError>>,
{
    let mut last_fault = match make_attempt().await {
        Ok(value) => return Ok(value),
        Err(fault) => fault,
    };

    for (retry_index, delay) in RETRY_DELAY_LADDER.iter().enumerate() {
        warn!(
            "🔁 [UPLINK_RETRY]: [{}] attempt {} failed ({}). Backing off {:?}.",
            operation_label,
            retry_index + 1,
            last_fault,
            delay
        );
        tokio::time::sleep(*delay).await;

        match make_attempt().await {
            Ok(value) => return Ok(value),
            Err(fault) => last_fault = fault,
        }
    }

    Err(last_fault)
}

// FIN DEL ARCHIVO [libs/infra/uplink-client/src/backoff.rs]
