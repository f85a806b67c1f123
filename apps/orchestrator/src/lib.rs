// [apps/orchestrator/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR LIBRARY REGISTRY (V4.0 - ATLAS)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE LOS ESTRATOS DEL CONDUCTOR
 * =================================================================
 */

pub mod bootstrap;
pub mod kernel;
pub mod middleware;
pub mod routes;
pub mod handlers;
pub mod services;
pub mod state;

pub mod prelude {
    pub use crate::bootstrap::EnvironmentConfig;
    pub use crate::kernel::OrchestratorKernel;
    pub use crate::services::refresh_conductor::{CycleBudget, RefreshConductor};
    pub use crate::state::AppState;
}
