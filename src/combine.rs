// 🔗 Combiner - merge TIPI and Siscomex into one enriched record per NCM

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::classify::{capitulo, detect_anuentes, detect_setor, estimate_ii_rate};
use crate::siscomex::SiscomexEntry;
use crate::tipi::TipiEntry;

/// PIS/COFINS do regime não-cumulativo (constantes).
pub const ALIQUOTA_PIS: f64 = 2.10;
pub const ALIQUOTA_COFINS: f64 = 9.65;

/// Combined record, one per NCM across both sources.
///
/// Field names are the wire contract expected by the database importer;
/// serialization order follows declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NcmRecord {
    pub ncm: String,
    pub descricao: String,
    pub capitulo: String,
    pub aliquota_ii: f64,
    pub aliquota_ipi: f64,
    pub aliquota_pis: f64,
    pub aliquota_cofins: f64,
    pub anuentes: Vec<String>,
    pub requer_lpco: bool,
    pub setor: String,
    /// "TIPI" when the code was present in the TIPI table, "estimado"
    /// otherwise. The label tracks presence only; an absent IPI stays 0.0,
    /// no estimation runs.
    pub fonte_ipi: String,
    pub fonte_ncm: String,
}

/// Union both key sets and build one record per NCM, in ascending code
/// order (lexical = numeric for fixed-width digit strings).
pub fn combine(
    tipi: &BTreeMap<String, TipiEntry>,
    siscomex: &BTreeMap<String, SiscomexEntry>,
) -> Vec<NcmRecord> {
    let all_ncms: BTreeSet<&String> = tipi.keys().chain(siscomex.keys()).collect();

    let mut combined = Vec::with_capacity(all_ncms.len());

    for ncm in all_ncms {
        let tipi_info = tipi.get(ncm);
        let siscomex_info = siscomex.get(ncm);

        // Descrição do Siscomex é mais completa; fallback para a do TIPI
        let descricao = siscomex_info
            .map(|s| s.descricao.as_str())
            .filter(|d| !d.is_empty())
            .or_else(|| tipi_info.map(|t| t.descricao_tipi.as_str()))
            .unwrap_or("")
            .to_string();

        let aliquota_ipi = tipi_info.map(|t| t.aliquota_ipi).unwrap_or(0.0);

        let setor = detect_setor(ncm, &descricao);
        let anuentes = detect_anuentes(ncm, &descricao, &setor);
        let aliquota_ii = estimate_ii_rate(&setor);

        combined.push(NcmRecord {
            ncm: ncm.clone(),
            capitulo: capitulo(ncm).to_string(),
            descricao,
            aliquota_ii,
            aliquota_ipi,
            aliquota_pis: ALIQUOTA_PIS,
            aliquota_cofins: ALIQUOTA_COFINS,
            requer_lpco: !anuentes.is_empty(),
            anuentes,
            setor,
            fonte_ipi: if tipi_info.is_some() { "TIPI" } else { "estimado" }.to_string(),
            fonte_ncm: if siscomex_info.is_some() { "Siscomex" } else { "TIPI" }.to_string(),
        });
    }

    combined
}

// ============================================================================
// TESTS
// ============================================================================
