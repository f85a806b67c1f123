// INICIO DEL ARCHIVO [apps/orchestrator/src/bootstrap.rs]
/*!
 * =================================================================
 * APARATO: ENVIRONMENT BOOTSTRAP (V4.1 - STRICT CAPTURE)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CAPTURA Y VALIDACIÓN DEL ENTORNO SOBERANO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. FAIL FAST: Toda variable obligatoria ausente se reporta ANTES de
 *    abrir el socket o tocar el Motor A.
 * 2. NOMINAL CAPTURE: Las credenciales viven en un struct tipado, no
 *    en lecturas dispersas de std::env.
 * =================================================================
 */

use anyhow::{Context, Result};

/// Configuración capturada del entorno del proceso.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Credencial del registro federal de estaciones.
    pub stations_api_key: String,
    /// Credencial del servicio censal de población.
    pub population_api_key: String,
    /// URL del Motor A (libsql://, https://, archivo o :memory:).
    pub db_url: String,
    /// Token de servicio para clusters remotos de Turso.
    pub db_service_role_key: Option<String>,
    /// Secreto que gobierna el webhook del scheduler.
    pub cron_secret: String,
    /// Puerto de escucha del estrato HTTP.
    pub listening_port: u16,
}

impl EnvironmentConfig {
    /// Captura estricta del entorno. `dotenvy` debe haberse hidratado
    /// antes (responsabilidad del punto de ignición).
    pub fn capture() -> Result<Self> {
        let stations_api_key = std::env::var("STATIONS_API_KEY")
            .context("CRITICAL_FAULT: STATIONS_API_KEY not defined in runtime environment")?;
        let population_api_key = std::env::var("POPULATION_API_KEY")
            .context("CRITICAL_FAULT: POPULATION_API_KEY not defined in runtime environment")?;
        let db_url = std::env::var("DB_URL")
            .context("CRITICAL_FAULT: DB_URL not defined in runtime environment")?;
        let cron_secret = std::env::var("CRON_SECRET")
            .context("CRITICAL_FAULT: CRON_SECRET not defined in runtime environment")?;

        let db_service_role_key = std::env::var("DB_SERVICE_ROLE_KEY").ok();

        let listening_port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        Ok(Self {
            stations_api_key,
            population_api_key,
            db_url,
            db_service_role_key,
            cron_secret,
            listening_port,
        })
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/bootstrap.rs]
