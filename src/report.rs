// 📈 Reporter - run statistics and output writing

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::combine::NcmRecord;

/// How many setores the console ranking shows.
const TOP_SETORES: usize = 15;

/// Summary statistics over the combined record set. Console-only,
/// informational; not part of the persisted contract.
#[derive(Debug, Clone)]
pub struct Estatisticas {
    pub total: usize,
    /// (setor, contagem) ordered by count descending, setor name as
    /// tie-breaker for stable output.
    pub por_setor: Vec<(String, usize)>,
    pub com_anuentes: usize,
    pub com_ipi: usize,
}

impl Estatisticas {
    pub fn compute(records: &[NcmRecord]) -> Self {
        let mut contagens: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *contagens.entry(record.setor.as_str()).or_insert(0) += 1;
        }

        let mut por_setor: Vec<(String, usize)> = contagens
            .into_iter()
            .map(|(setor, count)| (setor.to_string(), count))
            .collect();
        por_setor.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Estatisticas {
            total: records.len(),
            por_setor,
            com_anuentes: records.iter().filter(|r| !r.anuentes.is_empty()).count(),
            com_ipi: records.iter().filter(|r| r.aliquota_ipi > 0.0).count(),
        }
    }

    pub fn pct_com_anuentes(&self) -> f64 {
        pct(self.com_anuentes, self.total)
    }

    pub fn pct_com_ipi(&self) -> f64 {
        pct(self.com_ipi, self.total)
    }

    pub fn print(&self) {
        println!("Total de NCMs: {}", self.total);

        println!("\nPor setor:");
        for (setor, count) in self.por_setor.iter().take(TOP_SETORES) {
            println!("  {}: {}", setor, count);
        }

        println!(
            "\nCom anuentes necessários: {} ({:.1}%)",
            self.com_anuentes,
            self.pct_com_anuentes()
        );
        println!(
            "Com alíquota IPI > 0: {} ({:.1}%)",
            self.com_ipi,
            self.pct_com_ipi()
        );
    }
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Serialize the records as pretty-printed UTF-8 JSON (non-ASCII preserved
/// literally) and write them to `path`. Returns the SHA-256 of the bytes
/// written, for the console integrity line.
pub fn write_output(path: &Path, records: &[NcmRecord]) -> Result<String> {
    let json = serde_json::to_string_pretty(records)
        .context("Failed to serialize combined records")?;

    fs::write(path, &json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Print the first `n` records in the console sample format.
pub fn print_amostra(records: &[NcmRecord], n: usize) {
    for record in records.iter().take(n) {
        let resumo: String = record.descricao.chars().take(80).collect();

        println!("\nNCM: {}", record.ncm);
        println!("  Descrição: {}...", resumo);
        println!("  Setor: {}", record.setor);
        println!("  II: {}%, IPI: {}%", record.aliquota_ii, record.aliquota_ipi);
        println!(
            "  PIS: {}%, COFINS: {}%",
            record.aliquota_pis, record.aliquota_cofins
        );
        println!("  Anuentes: {:?}", record.anuentes);
    }
}

// ============================================================================
// TESTS
// ============================================================================
