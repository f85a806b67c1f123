// INICIO DEL ARCHIVO [apps/orchestrator/src/kernel.rs]
/**
 * =================================================================
 * APARATO: ORCHESTRATOR SOVEREIGN KERNEL (V4.4 - ATLAS)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: ENSAMBLAJE DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan el Motor A, los tres
 * túneles salientes, las tablas geográficas y el conductor. El enlace
 * con la base de datos se establece ANTES de abrir el socket.
 * =================================================================
 */

use crate::bootstrap::EnvironmentConfig;
use crate::routes::create_atlas_router;
use crate::services::refresh_conductor::RefreshConductor;
use crate::state::AppState;
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{info, instrument};
use voltaic_core_geospatial::{CountyTopology, ZipCountyIndex};
use voltaic_infra_db::TursoClient;
use voltaic_infra_uplink::{
    CensusPopulationClient, StationRegistryClient, VmtUplinkClient, DEFAULT_CENSUS_URL,
    DEFAULT_REGISTRY_URL, DEFAULT_VMT_URL,
};

pub struct OrchestratorKernel {
    pub server_network_port: u16,
    pub application_shared_state: AppState,
}

impl OrchestratorKernel {
    /**
     * Realiza la ignición del cliente táctico y el estado del atlas.
     * Establece la conexión al Motor A antes de levantar servicios.
     */
    #[instrument(skip(environment))]
    pub async fn ignite(environment: &EnvironmentConfig) -> Result<Self> {
        let database_client = TursoClient::connect(
            &environment.db_url,
            environment.db_service_role_key.clone(),
        )
        .await
        .context("KERNEL_FAULT: Motor A ignition failed")?;

        let county_topology = Arc::new(
            CountyTopology::load().context("KERNEL_FAULT: county topology hydration failed")?,
        );
        let zip_county_index = Arc::new(
            ZipCountyIndex::load().context("KERNEL_FAULT: zip-county index hydration failed")?,
        );

        let registry_client = StationRegistryClient::new(
            DEFAULT_REGISTRY_URL.to_string(),
            environment.stations_api_key.clone(),
        );
        let census_client = CensusPopulationClient::new(
            DEFAULT_CENSUS_URL.to_string(),
            environment.population_api_key.clone(),
        );
        let vmt_client = VmtUplinkClient::new(DEFAULT_VMT_URL.to_string());

        let refresh_conductor = RefreshConductor::assemble(
            database_client,
            registry_client,
            census_client,
            vmt_client,
            county_topology,
            zip_county_index,
        );

        info!("🧠 [KERNEL]: Atlas strata assembled and level.");

        Ok(Self {
            server_network_port: environment.listening_port,
            application_shared_state: AppState {
                refresh_conductor: Arc::new(refresh_conductor),
                cron_secret: environment.cron_secret.clone(),
            },
        })
    }

    /**
     * Levanta el estrato HTTP del orquestador y bloquea hasta el cierre.
     */
    pub async fn launch_sovereign_operations(self) -> Result<()> {
        let binding_address = SocketAddr::new(
            "0.0.0.0".parse::<IpAddr>().expect("static address"),
            self.server_network_port,
        );

        let atlas_router = create_atlas_router(self.application_shared_state);

        info!(
            "🚀 [ATLAS_ONLINE]: Orchestrator listening on port {}.",
            binding_address.port()
        );

        let tcp_listener = tokio::net::TcpListener::bind(binding_address)
            .await
            .context("KERNEL_FAULT: TCP socket binding failed")?;

        axum::serve(tcp_listener, atlas_router)
            .await
            .context("KERNEL_FAULT: HTTP stratum collapsed")?;

        Ok(())
    }
}
// FIN DEL ARCHIVO [apps/orchestrator/src/kernel.rs]
