// 📊 TIPI Parser - tabular source of IPI rates
// Reads the TIPI table export (CSV) and keeps one entry per valid NCM

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::normalize::{is_valid_ncm, normalize_ncm, parse_aliquota, truncate_descricao};

/// Rows of title/preamble before the TIPI data starts.
pub const TIPI_HEADER_ROWS: usize = 8;

/// One TIPI row worth keeping: the declared IPI rate plus the TIPI's own
/// description (used as fallback when the Siscomex has none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipiEntry {
    pub aliquota_ipi: f64,
    pub descricao_tipi: String,
}

/// Parse the TIPI export and return NCM → entry.
///
/// Columns are positional: (ncm, ex, descrição, alíquota IPI). The EX column
/// (ex-tarifário marker) is not used. Rows whose code does not normalize to
/// 8 digits are skipped; when the same NCM appears twice the later row wins.
pub fn parse_tipi(path: &Path) -> Result<BTreeMap<String, TipiEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open TIPI file: {}", path.display()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut tipi_data = BTreeMap::new();

    for (row_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse TIPI row {} in {}", row_num + 1, path.display())
        })?;

        if row_num < TIPI_HEADER_ROWS {
            continue;
        }

        let ncm_raw = record.get(0).unwrap_or("");
        let descricao = record.get(2).unwrap_or("");
        let aliquota_raw = record.get(3).unwrap_or("");

        let ncm = normalize_ncm(ncm_raw);
        if !is_valid_ncm(&ncm) {
            continue;
        }

        tipi_data.insert(
            ncm,
            TipiEntry {
                aliquota_ipi: parse_aliquota(aliquota_raw),
                descricao_tipi: truncate_descricao(descricao),
            },
        );
    }

    Ok(tipi_data)
}

// ============================================================================
// TESTS
// ============================================================================
