// INICIO DEL ARCHIVO [libs/infra/db-turso/src/repositories/coordination.rs]
/*!
 * =================================================================
 * APARATO: CYCLE COORDINATION REPOSITORY (V3.1 - NAMED LOCK)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CANDADO DE CICLO ÚNICO Y CHECKPOINT REANUDABLE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DB-LEVEL LOCK: El candado es una fila única en el Motor A, no un
 *    mutex de proceso: el scheduler puede ejecutar réplicas.
 * 2. RESUMABLE CHECKPOINT: Fase + manifiesto + ZIPs residuales
 *    persisten; un reinicio de proceso reanuda en vez de re-ingerir.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::{DateTime, Utc};
use libsql::params;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};
use voltaic_domain_models::{ChangeManifest, CyclePhase, ZipKey};

/// Nombre del candado global de ciclo.
pub const CYCLE_LOCK_NAME: &str = "refresh_cycle";

/// Clave única de la fila de checkpoint activa.
const ACTIVE_CHECKPOINT_KEY: &str = "active";

/// Desenlace del intento de adquisición del candado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAcquisition {
    /// El candado es nuestro; el ciclo puede arrancar.
    Acquired,
    /// Otro ciclo vivo lo sostiene (porta su identificador).
    HeldBy(String),
}

/// Estado persistido de un ciclo en curso.
#[derive(Debug, Clone)]
pub struct CycleCheckpoint {
    pub cycle_id: String,
    pub phase: CyclePhase,
    pub manifest: ChangeManifest,
    pub residual_zips: BTreeSet<ZipKey>,
    pub inserted: u32,
    pub rejected: u32,
    pub state_rows: u32,
    pub county_rows: u32,
}

/// Repositorio de coordinación de ciclos.
pub struct CoordinationRepository {
    database_client: TursoClient,
}

impl CoordinationRepository {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Intenta tomar el candado global. La inserción condicional es
    /// atómica en el Motor A: exactamente un ciclo la gana.
    #[instrument(skip(self))]
    pub async fn acquire_lock(
        &self,
        cycle_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LockAcquisition, DbError> {
        let connection = self.database_client.get_connection()?;

        let inserted_rows = connection
            .execute(
                "INSERT OR IGNORE INTO cycle_coordination (lock_name, cycle_id, acquired_at) \
                 VALUES (?1, ?2, ?3)",
                params![CYCLE_LOCK_NAME, cycle_id, now.to_rfc3339()],
            )
            .await?;

        if inserted_rows > 0 {
            info!("🔐 [COORDINATION]: Cycle lock acquired by [{}].", cycle_id);
            return Ok(LockAcquisition::Acquired);
        }

        let mut query_results = connection
            .query(
                "SELECT cycle_id FROM cycle_coordination WHERE lock_name = ?1",
                params![CYCLE_LOCK_NAME],
            )
            .await?;

        let holder_cycle_id = match query_results.next().await? {
            Some(data_row) => data_row.get::<String>(0)?,
            // Carrera benigna: el tenedor liberó entre el INSERT y el SELECT.
            None => {
                return self.acquire_lock_second_chance(cycle_id, now).await;
            }
        };

        Ok(LockAcquisition::HeldBy(holder_cycle_id))
    }

    async fn acquire_lock_second_chance(
        &self,
        cycle_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LockAcquisition, DbError> {
        let connection = self.database_client.get_connection()?;
        let inserted_rows = connection
            .execute(
                "INSERT OR IGNORE INTO cycle_coordination (lock_name, cycle_id, acquired_at) \
                 VALUES (?1, ?2, ?3)",
                params![CYCLE_LOCK_NAME, cycle_id, now.to_rfc3339()],
            )
            .await?;

        if inserted_rows > 0 {
            Ok(LockAcquisition::Acquired)
        } else {
            Ok(LockAcquisition::HeldBy("unknown".to_string()))
        }
    }

    /// Libera el candado si y sólo si lo sostiene el ciclo indicado.
    #[instrument(skip(self))]
    pub async fn release_lock(&self, cycle_id: &str) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        let released_rows = connection
            .execute(
                "DELETE FROM cycle_coordination WHERE lock_name = ?1 AND cycle_id = ?2",
                params![CYCLE_LOCK_NAME, cycle_id],
            )
            .await?;

        if released_rows > 0 {
            debug!("🔓 [COORDINATION]: Cycle lock released by [{}].", cycle_id);
        }
        Ok(())
    }

    /// Cristaliza el checkpoint del ciclo activo (upsert sobre la fila única).
    #[instrument(skip(self, checkpoint), fields(cycle_id = %checkpoint.cycle_id, phase = checkpoint.phase.as_label()))]
    pub async fn save_checkpoint(
        &self,
        checkpoint: &CycleCheckpoint,
        now: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let manifest_json = serde_json::to_string(&checkpoint.manifest)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;
        let residual_zips_json = serde_json::to_string(&checkpoint.residual_zips)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO cycle_checkpoint (checkpoint_key, cycle_id, phase, manifest_json, \
                 residual_zips_json, inserted_stations, rejected_records, state_rows, county_rows, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
                 ON CONFLICT(checkpoint_key) DO UPDATE SET \
                     cycle_id = excluded.cycle_id, \
                     phase = excluded.phase, \
                     manifest_json = excluded.manifest_json, \
                     residual_zips_json = excluded.residual_zips_json, \
                     inserted_stations = excluded.inserted_stations, \
                     rejected_records = excluded.rejected_records, \
                     state_rows = excluded.state_rows, \
                     county_rows = excluded.county_rows, \
                     updated_at = excluded.updated_at",
                params![
                    ACTIVE_CHECKPOINT_KEY,
                    checkpoint.cycle_id.clone(),
                    checkpoint.phase.as_label(),
                    manifest_json,
                    residual_zips_json,
                    i64::from(checkpoint.inserted),
                    i64::from(checkpoint.rejected),
                    i64::from(checkpoint.state_rows),
                    i64::from(checkpoint.county_rows),
                    now.to_rfc3339(),
                ],
            )
            .await?;

        Ok(())
    }

    /// Recupera el checkpoint activo, si existe.
    pub async fn load_checkpoint(&self) -> Result<Option<CycleCheckpoint>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query(
                "SELECT cycle_id, phase, manifest_json, residual_zips_json, \
                 inserted_stations, rejected_records, state_rows, county_rows \
                 FROM cycle_checkpoint WHERE checkpoint_key = ?1",
                params![ACTIVE_CHECKPOINT_KEY],
            )
            .await?;

        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        let phase_label: String = data_row.get(1)?;
        let phase = CyclePhase::from_label(&phase_label).ok_or_else(|| {
            DbError::MappingError(format!("unknown cycle phase label [{phase_label}]"))
        })?;

        let manifest_json: String = data_row.get(2)?;
        let manifest: ChangeManifest = serde_json::from_str(&manifest_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        let residual_zips_json: String = data_row.get(3)?;
        let residual_zips: BTreeSet<ZipKey> = serde_json::from_str(&residual_zips_json)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        Ok(Some(CycleCheckpoint {
            cycle_id: data_row.get(0)?,
            phase,
            manifest,
            residual_zips,
            inserted: data_row.get::<i64>(4)? as u32,
            rejected: data_row.get::<i64>(5)? as u32,
            state_rows: data_row.get::<i64>(6)? as u32,
            county_rows: data_row.get::<i64>(7)? as u32,
        }))
    }

    /// Borra el checkpoint al cierre del ciclo (promoción o aborto).
    #[instrument(skip(self))]
    pub async fn clear_checkpoint(&self) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "DELETE FROM cycle_checkpoint WHERE checkpoint_key = ?1",
                params![ACTIVE_CHECKPOINT_KEY],
            )
            .await?;
        Ok(())
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/repositories/coordination.rs]
