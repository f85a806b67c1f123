// [apps/orchestrator/src/main.rs]
/*!
 * =================================================================
 * APARATO: ORCHESTRATOR MAIN ENTRY POINT (V4.5 - DUAL SURFACE)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL SURFACE: `serve` levanta el webhook del scheduler; `cycle`
 *    ejecuta un tick y reporta por código de salida de shell:
 *    0 éxito / sin cambios, 2 ciclo en curso, 3 upstream, 4 promoción,
 *    5 completitud parcial.
 * 2. ZERO ABBREVIATIONS: Nomenclatura nominal absoluta en la captura
 *    de entorno y configuración de red.
 * =================================================================
 */

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::{error, info};
use voltaic_domain_models::CycleOutcome;
use voltaic_orchestrator::prelude::*;
use voltaic_shared_heimdall::init_tracing;

/// Superficie de mando del orquestador del atlas.
#[derive(Parser)]
#[command(name = "orchestrator", about = "Voltaic Atlas refresh orchestrator")]
struct CommandLineInterface {
    #[command(subcommand)]
    command: OrchestratorCommand,
}

#[derive(Subcommand)]
enum OrchestratorCommand {
    /// Levanta el estrato HTTP (webhook del scheduler + salud).
    Serve,
    /// Ejecuta un tick del ciclo de refresco y termina.
    Cycle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (HEIMDALL)
    init_tracing("voltaic_orchestrator");

    let interface = CommandLineInterface::parse();

    // 3. RUNTIME SOBERANO
    let runtime_orchestrator = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_orchestrator.block_on(async {
        info!("🛰️  [COMMAND_CENTER]: Global ignition sequence starting...");

        let environment = EnvironmentConfig::capture()?;
        let kernel_instance = OrchestratorKernel::ignite(&environment).await?;

        match interface.command {
            OrchestratorCommand::Serve => {
                kernel_instance.launch_sovereign_operations().await?;
            }
            OrchestratorCommand::Cycle => {
                let tick_budget = CycleBudget::for_host_ceiling();
                let verdict = kernel_instance
                    .application_shared_state
                    .refresh_conductor
                    .execute_cycle(&tick_budget)
                    .await;

                let shell_exit_code = match verdict {
                    Ok(report) => {
                        info!("🏁 [CYCLE]: {}", report.message);
                        match report.outcome {
                            CycleOutcome::Promoted | CycleOutcome::NoChanges => 0,
                            CycleOutcome::Partial => 5,
                        }
                    }
                    Err(cycle_fault) => {
                        error!("❌ [CYCLE]: {}", cycle_fault);
                        cycle_fault.shell_exit_code()
                    }
                };

                std::process::exit(shell_exit_code);
            }
        }

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
