// INICIO DEL ARCHIVO [libs/infra/db-turso/src/repositories/reference_cache.rs]
/*!
 * =================================================================
 * APARATO: REFERENCE CACHE REPOSITORY (V2.8 - TTL AWARE)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CACHÉS DE POBLACIÓN (TTL 30 DÍAS) Y VMT (WHOLESALE)
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. POISON SHIELD: Los fallos del uplink degradan a estimación pero
 *    JAMÁS se escriben en la caché; sólo lecturas censales vivas
 *    cristalizan aquí.
 * 2. WHOLESALE VMT: La tabla VMT se reemplaza entera en cada ingesta;
 *    sin expiración, la última cosecha es la verdad.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use chrono::{DateTime, Duration, Utc};
use libsql::params;
use std::collections::HashMap;
use tracing::{debug, instrument};
use voltaic_domain_models::CountyVmtRecord;

/// TTL de la caché de población.
pub const POPULATION_TTL_DAYS: i64 = 30;

/// Registro de caché de población con su marca de captura.
#[derive(Debug, Clone)]
pub struct CachedPopulation {
    pub value: u64,
    pub display_name: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Repositorio de cachés de referencia (población y tráfico).
pub struct ReferenceCacheRepository {
    database_client: TursoClient,
}

impl ReferenceCacheRepository {
    #[must_use]
    pub fn new(database_client: TursoClient) -> Self {
        Self { database_client }
    }

    /// Acierto de caché de población DENTRO del TTL de 30 días.
    /// Un registro vencido se reporta como ausente (el oráculo decide
    /// si re-consulta el uplink).
    #[instrument(skip(self))]
    pub async fn fresh_population(
        &self,
        region_type: &str,
        region_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedPopulation>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query(
                "SELECT population, display_name, fetched_at FROM population_cache \
                 WHERE region_type = ?1 AND region_code = ?2",
                params![region_type, region_code],
            )
            .await?;

        let Some(data_row) = query_results.next().await? else {
            return Ok(None);
        };

        let fetched_at_text: String = data_row.get(2)?;
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_at_text)
            .map_err(|fault| DbError::MappingError(format!("bad fetched_at: {fault}")))?
            .with_timezone(&Utc);

        if now - fetched_at > Duration::days(POPULATION_TTL_DAYS) {
            debug!(
                "⌛ [REFERENCE_CACHE]: Stale population for [{}:{}], TTL exceeded.",
                region_type, region_code
            );
            return Ok(None);
        }

        Ok(Some(CachedPopulation {
            value: data_row.get::<i64>(0)? as u64,
            display_name: data_row.get::<Option<String>>(1)?,
            fetched_at,
        }))
    }

    /// Cristaliza una lectura censal viva en la caché.
    #[instrument(skip(self))]
    pub async fn upsert_population(
        &self,
        region_type: &str,
        region_code: &str,
        population: u64,
        display_name: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "INSERT INTO population_cache (region_type, region_code, population, display_name, fetched_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(region_type, region_code) DO UPDATE SET \
                     population = excluded.population, \
                     display_name = excluded.display_name, \
                     fetched_at = excluded.fetched_at",
                params![
                    region_type,
                    region_code,
                    population as i64,
                    display_name,
                    fetched_at.to_rfc3339(),
                ],
            )
            .await?;
        Ok(())
    }

    /// Reemplazo al por mayor de la tabla VMT en una transacción.
    #[instrument(skip(self, records), fields(record_count = records.len()))]
    pub async fn replace_vmt_wholesale(
        &self,
        records: &[CountyVmtRecord],
        harvested_at: DateTime<Utc>,
    ) -> Result<usize, DbError> {
        let connection = self.database_client.get_connection()?;
        let wholesale_transaction = connection.transaction().await.map_err(DbError::QueryError)?;

        wholesale_transaction
            .execute("DELETE FROM vmt_cache", ())
            .await?;

        for record in records {
            wholesale_transaction
                .execute(
                    "INSERT OR REPLACE INTO vmt_cache (county_fips, annual_vmt, harvested_at) \
                     VALUES (?1, ?2, ?3)",
                    params![
                        record.county_fips.clone(),
                        record.annual_vmt,
                        harvested_at.to_rfc3339(),
                    ],
                )
                .await?;
        }

        wholesale_transaction
            .commit()
            .await
            .map_err(|_| DbError::TransactionError)?;

        Ok(records.len())
    }

    /// VMT anual de un condado, si la última cosecha lo conoce.
    pub async fn annual_vmt_for(&self, county_fips: &str) -> Result<Option<f64>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query(
                "SELECT annual_vmt FROM vmt_cache WHERE county_fips = ?1",
                params![county_fips],
            )
            .await?;

        match query_results.next().await? {
            Some(data_row) => Ok(Some(data_row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Índice completo FIPS -> VMT anual para la pasada de agregación.
    pub async fn vmt_index(&self) -> Result<HashMap<String, f64>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut query_results = connection
            .query("SELECT county_fips, annual_vmt FROM vmt_cache", ())
            .await?;

        let mut index = HashMap::new();
        while let Some(data_row) = query_results.next().await? {
            index.insert(data_row.get::<String>(0)?, data_row.get::<f64>(1)?);
        }
        Ok(index)
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/repositories/reference_cache.rs]
