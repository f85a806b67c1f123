// [libs/domain/models-rs/src/tests_serialization.rs]
/**
 * =================================================================
 * APARATO: DOMAIN SERIALIZATION TEST (V3.0 - INTEGRATION LEVEL)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON DEL CONTRATO ATLAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONTRACT PARITY: El cliente de mapa consume estos mismos JSON;
 *    cualquier deriva de renombrado serde rompe el atlas visual.
 * 2. ENUM FIDELITY: Los conectores del registro federal llegan en
 *    mayúsculas (J1772COMBO); variantes desconocidas degradan a Other.
 * =================================================================
 */
