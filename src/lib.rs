// NCM Pipeline - Core Library
// Exposes all modules for use in the CLI and tests

pub mod classify;
pub mod combine;
pub mod db;
pub mod normalize;
pub mod report;
pub mod siscomex;
pub mod tipi;

// Re-export commonly used types
pub use classify::{capitulo, detect_anuentes, detect_setor, estimate_ii_rate};
pub use combine::{combine, NcmRecord, ALIQUOTA_COFINS, ALIQUOTA_PIS};
pub use db::{
    count_by_setor, insert_records, load_combined, record_import_run, setup_database,
    verify_count, ImportRun,
};
pub use normalize::{is_valid_ncm, normalize_ncm, parse_aliquota, truncate_descricao};
pub use report::{print_amostra, write_output, Estatisticas};
pub use siscomex::{parse_siscomex, SiscomexEntry};
pub use tipi::{parse_tipi, TipiEntry, TIPI_HEADER_ROWS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
