// [libs/infra/db-turso/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE ADAPTER REGISTRY (V3.0 - MOTOR A)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: FACHADA DEL ADAPTADOR libSQL / TURSO
 * =================================================================
 */

pub mod client;
pub mod errors;
pub mod schema;
pub mod repositories;
pub mod promotion;

pub use client::TursoClient;
pub use errors::DbError;
pub use promotion::PromotionAuthority;
