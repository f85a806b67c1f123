// INICIO DEL ARCHIVO [libs/infra/db-turso/src/client.rs]
/*!
 * =================================================================
 * APARATO: ATLAS DATABASE CLIENT (V4.0 - DUAL STRATA AWARE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE CONEXIÓN Y CERTIFICACIÓN DE ESTRATOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. TOPOLOGY FIRST: La URL se clasifica en una topología nominal
 *    (cluster remoto / archivo local / memoria compartida) y cada
 *    topología dicta su propio ciclo de vida de conexión.
 * 2. DUAL STRATA CERTIFICATION: Tras sincronizar el esquema, el
 *    cliente sondea los cuatro pares staging/serving del atlas; un
 *    par ausente aborta la ignición antes de aceptar ciclos.
 * 3. ANCHOR DISCIPLINE: En memoria compartida, la conexión de
 *    bootstrap queda anclada de por vida; si SQLite purga el segmento
 *    entre consultas, la promoción atómica perdería sus tablas.
 * =================================================================
 */

use crate::errors::DbError;
use crate::schema::apply_full_atlas_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Entidades cuya pareja staging/serving certifica la ignición.
const DUAL_STRATA_PROBES: &[&str] = &[
    "stations",
    "state_aggregates",
    "county_aggregates",
    "zip_aggregates",
];

/// Topología del enlace con el Motor A, derivada de la URL de conexión.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionTopology {
    /// Cluster Turso (libsql:// o https://); exige el token de servicio.
    RemoteCluster,
    /// Archivo SQLite local: despliegues de un solo nodo y réplicas frías.
    LocalFile,
    /// Memoria compartida del Proving Grounds; exige ancla de persistencia.
    SharedMemory,
}

impl ConnectionTopology {
    fn classify(database_connection_url: &str) -> Self {
        if database_connection_url.starts_with("libsql://")
            || database_connection_url.starts_with("https://")
        {
            ConnectionTopology::RemoteCluster
        } else if database_connection_url.contains(":memory:")
            || database_connection_url.contains("mode=memory")
        {
            ConnectionTopology::SharedMemory
        } else {
            ConnectionTopology::LocalFile
        }
    }
}

/// Cliente táctico del Motor A. Clonable: el driver subyacente se
/// comparte vía Arc entre repositorios y la autoridad de promoción.
#[derive(Clone)]
pub struct TursoClient {
    internal_database_driver: Arc<Database>,
    /// Sólo en topología de memoria: mantiene vivo el segmento
    /// compartido donde residen los estratos del atlas.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl TursoClient {
    /// Establece el enlace, sincroniza el esquema del atlas y certifica
    /// los pares staging/serving antes de entregar el cliente.
    #[instrument(skip(database_access_token))]
    pub async fn connect(
        database_connection_url: &str,
        database_access_token: Option<String>,
    ) -> Result<Self, DbError> {
        if database_connection_url.trim().is_empty() {
            return Err(DbError::ConfigurationError("DB_URL_UNDEFINED".into()));
        }

        let topology = ConnectionTopology::classify(database_connection_url);
        info!(
            "🔌 [DATABASE]: Igniting {:?} link to [{}]",
            topology, database_connection_url
        );

        let database_driver = match topology {
            ConnectionTopology::RemoteCluster => {
                let service_token = database_access_token.ok_or_else(|| {
                    DbError::ConfigurationError(
                        "DB_SERVICE_ROLE_KEY required for remote clusters".into(),
                    )
                })?;
                Builder::new_remote(database_connection_url.to_string(), service_token)
                    .build()
                    .await
            }
            ConnectionTopology::LocalFile | ConnectionTopology::SharedMemory => {
                Builder::new_local(database_connection_url).build().await
            }
        }
        .map_err(|ignition_fault| {
            DbError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {ignition_fault}"))
        })?;

        let shared_driver = Arc::new(database_driver);

        // Una única conexión de bootstrap conduce la sincronización del
        // esquema y la certificación de estratos; en memoria compartida
        // esa misma conexión se retiene como ancla.
        let bootstrap_connection = shared_driver.connect().map_err(|link_fault| {
            DbError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {link_fault}"))
        })?;

        apply_full_atlas_schema(&bootstrap_connection)
            .await
            .map_err(|schema_fault| {
                DbError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {schema_fault}"))
            })?;

        Self::certify_dual_strata(&bootstrap_connection).await?;

        let memory_persistence_anchor = match topology {
            ConnectionTopology::SharedMemory => {
                info!("⚓ [DATABASE]: Memory strata anchored for the atlas lifetime.");
                Some(Arc::new(bootstrap_connection))
            }
            _ => None,
        };

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: memory_persistence_anchor,
        })
    }

    /// Conexión fresca del driver compartido. Cada repositorio abre la
    /// suya; las transacciones jamás cruzan repositorios.
    pub fn get_connection(&self) -> Result<Connection, DbError> {
        self.internal_database_driver.connect().map_err(|pool_fault| {
            DbError::ConnectionError(format!("POOL_ALLOCATION_FAULT: {pool_fault}"))
        })
    }

    /// Sondea que cada entidad promovible exista en sus dos estratos.
    /// Un par incompleto rompería el renombrado atómico a mitad de
    /// transacción; mejor rechazar la ignición aquí.
    async fn certify_dual_strata(bootstrap_connection: &Connection) -> Result<(), DbError> {
        for base_table in DUAL_STRATA_PROBES {
            for stratum_table in [(*base_table).to_string(), format!("{base_table}_staging")] {
                debug!("  🔍 Probing stratum table: {}", stratum_table);
                bootstrap_connection
                    .query(&format!("SELECT 1 FROM {stratum_table} LIMIT 0"), ())
                    .await
                    .map_err(|probe_fault| {
                        DbError::ConnectionError(format!(
                            "DUAL_STRATA_VOID: table [{stratum_table}] missing after schema sync -> {probe_fault}"
                        ))
                    })?;
            }
        }
        Ok(())
    }
}
// FIN DEL ARCHIVO [libs/infra/db-turso/src/client.rs]
