// INICIO DEL ARCHIVO [libs/infra/db-turso/src/promotion.rs]
/*!
 * =================================================================
 * APARATO: PROMOTION AUTHORITY (V3.0 - ATOMIC SWAP)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: RENOMBRADO ATÓMICO STAGING <-> SERVING (4 PARES)
 *
 * # Mathematical Proof (All-or-Nothing Swap):
 * Los doce ALTER TABLE viajan en UNA transacción del Motor A. SQLite
 * garantiza que un ROLLBACK deshace todo renombrado parcial: en ningún
 * instante observable una tabla serving mezcla filas pre- y post-swap,
 * ni queda un par a medio renombrar.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use tracing::{error, info, instrument};

/// Pares de entidades que el swap intercambia.
const PROMOTED_TABLE_PAIRS: &[&str] = &[
    "stations",
    "state_aggregates",
    "county_aggregates",
    "zip_aggregates",
];

/// Autoridad única del renombrado staging -> serving.
pub struct PromotionAuthority {
    database_client: TursoClient,
}

impl PromotionAuthority {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Ejecuta el swap atómico de los cuatro pares de tablas.
    ///
    /// Secuencia por par: serving -> _retired, _staging -> serving,
    /// _retired -> _staging. El censo recién validado pasa a atender
    /// consultas y el censo anterior queda como staging del próximo
    /// ciclo (que lo truncará).
    ///
    /// # Errors:
    /// `DbError::PromotionError` si cualquier renombrado colapsa; la
    /// transacción se revierte y serving queda intacto.
    #[instrument(skip(self))]
    pub async fn promote(&self) -> Result<(), DbError> {
        info!("👑 [PROMOTION]: Initiating atomic table swap (4 pairs)...");

        let connection = self.database_client.get_connection()?;
        let swap_transaction = connection
            .transaction()
            .await
            .map_err(|fault| DbError::PromotionError(fault.to_string()))?;

        for base_table in PROMOTED_TABLE_PAIRS {
            let rename_sequence = [
                format!("ALTER TABLE {base_table} RENAME TO {base_table}_retired"),
                format!("ALTER TABLE {base_table}_staging RENAME TO {base_table}"),
                format!("ALTER TABLE {base_table}_retired RENAME TO {base_table}_staging"),
            ];

            for rename_sql in &rename_sequence {
                if let Err(fault) = swap_transaction.execute(rename_sql, ()).await {
                    error!(
                        "❌ [PROMOTION_FAULT]: Rename collapsed on [{}]: {}",
                        base_table, fault
                    );
                    // El drop de la transacción sin commit revierte los
                    // renombrados ya aplicados.
                    return Err(DbError::PromotionError(format!(
                        "rename of [{base_table}] failed: {fault}"
                    )));
                }
            }
        }

        swap_transaction
            .commit()
            .await
            .map_err(|fault| DbError::PromotionError(format!("commit collapsed: {fault}")))?;

        info!("✅ [PROMOTION]: Serving strata now carries the refreshed census.");
        Ok(())
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/promotion.rs]
