// 🌐 Siscomex Parser - NCM nomenclature registry (JSON)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::normalize::{is_valid_ncm, normalize_ncm, truncate_descricao};

/// Envelope key used when the registry wraps its item list in an object.
const ENVELOPE_KEY: &str = "Nomenclaturas";

/// One registry item: description plus validity window (both dates optional,
/// kept as the registry's own strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiscomexEntry {
    pub descricao: String,
    pub data_inicio: String,
    pub data_fim: String,
}

impl SiscomexEntry {
    /// An entry with a closed validity window is no longer current.
    pub fn expirado(&self) -> bool {
        !self.data_fim.is_empty()
    }
}

/// Parse the Siscomex registry and return NCM → entry.
pub fn parse_siscomex(path: &Path) -> Result<BTreeMap<String, SiscomexEntry>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open Siscomex file: {}", path.display()))?;

    let reader = BufReader::new(file);
    let json: Value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;

    collect_entries(&json)
}

/// The registry ships either as a bare array or as an object enveloping the
/// array under "Nomenclaturas". The shape is resolved here once; the
/// iteration below sees a single item sequence either way.
fn extract_items(json: &Value) -> Result<&Vec<Value>> {
    match json {
        Value::Array(items) => Ok(items),
        Value::Object(map) => map
            .get(ENVELOPE_KEY)
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow::anyhow!("JSON object missing '{}' array", ENVELOPE_KEY)),
        _ => Err(anyhow::anyhow!(
            "Siscomex JSON must be an array or an object with '{}'",
            ENVELOPE_KEY
        )),
    }
}

fn collect_entries(json: &Value) -> Result<BTreeMap<String, SiscomexEntry>> {
    let items = extract_items(json)?;

    let mut siscomex_data: BTreeMap<String, SiscomexEntry> = BTreeMap::new();

    for item in items {
        let codigo = item.get("Codigo").and_then(|v| v.as_str()).unwrap_or("");

        let ncm = normalize_ncm(codigo);
        if !is_valid_ncm(&ncm) {
            continue;
        }

        let descricao = item.get("Descricao").and_then(|v| v.as_str()).unwrap_or("");
        let data_inicio = item.get("Data_Inicio").and_then(|v| v.as_str()).unwrap_or("");
        let data_fim = item.get("Data_Fim").and_then(|v| v.as_str()).unwrap_or("");

        let entry = SiscomexEntry {
            descricao: truncate_descricao(descricao),
            data_inicio: data_inicio.to_string(),
            data_fim: data_fim.to_string(),
        };

        // Keep-first-unexpired: once a code is stored, a later item that
        // carries a closing date does not replace it. A later item without
        // one may refresh the stored entry.
        if entry.expirado() && siscomex_data.contains_key(&ncm) {
            continue;
        }

        siscomex_data.insert(ncm, entry);
    }

    Ok(siscomex_data)
}

// ============================================================================
// TESTS
// ============================================================================
