// INICIO DEL ARCHIVO [libs/infra/db-turso/src/repositories/audit.rs]
/*!
 * =================================================================
 * APARATO: CHANGE LOG REPOSITORY (V2.2 - APPEND ONLY)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: BITÁCORA INMUTABLE DE CICLOS DE REFRESCO
 *
 * La bitácora se escribe una vez por ciclo y el núcleo jamás la lee;
 * existe para auditoría del operador.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::Utc;
use libsql::params;
use tracing::instrument;
use voltaic_domain_models::ChangeManifest;

/// Repositorio de la bitácora de cambios.
pub struct ChangeLogRepository {
    database_client: TursoClient,
}

impl ChangeLogRepository {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Sella el registro de un ciclo en la bitácora.
    #[instrument(skip(self, manifest), fields(cycle_id = %manifest.cycle_id))]
    pub async fn append_cycle_record(
        &self,
        manifest: &ChangeManifest,
        outcome_label: &str,
    ) -> Result<(), DbError> {
        let detected_at = manifest
            .detected_at
            .unwrap_or_else(Utc::now)
            .to_rfc3339();

        let affected_states_json = serde_json::to_string(&manifest.affected_states)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let affected_counties_json = serde_json::to_string(&manifest.affected_counties)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let affected_zips_json = serde_json::to_string(&manifest.affected_zips)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let totals_json = serde_json::to_string(&manifest.totals)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO change_log (cycle_id, detected_at, affected_states_json, \
                 affected_counties_json, affected_zips_json, totals_json, outcome) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    manifest.cycle_id.clone(),
                    detected_at,
                    affected_states_json,
                    affected_counties_json,
                    affected_zips_json,
                    totals_json,
                    outcome_label,
                ],
            )
            .await?;

        Ok(())
    }

    /// Conteo de registros de la bitácora (Proving Grounds).
    pub async fn record_count(&self) -> Result<u64, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection.query("SELECT COUNT(*) FROM change_log", ()).await?;
        let data_row = query_results
            .next()
            .await?
            .ok_or_else(|| DbError::MappingError("COUNT returned no row".to_string()))?;
        Ok(data_row.get::<i64>(0)? as u64)
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/repositories/audit.rs]
