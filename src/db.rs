use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::combine::NcmRecord;

/// Provenance row for one import run.
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub run_id: String,
    pub imported_at: String,
    pub record_count: usize,
    pub source_hash: String,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // NCM table - one row per code, refreshed on re-import
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS ncm (
            ncm TEXT PRIMARY KEY,
            descricao TEXT NOT NULL,
            capitulo TEXT NOT NULL,
            aliquota_ii REAL NOT NULL,
            aliquota_ipi REAL NOT NULL,
            aliquota_pis REAL NOT NULL,
            aliquota_cofins REAL NOT NULL,
            anuentes TEXT NOT NULL,
            requer_lpco INTEGER NOT NULL,
            setor TEXT NOT NULL,
            fonte_ipi TEXT NOT NULL,
            fonte_ncm TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Import runs table (provenance)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS import_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT UNIQUE NOT NULL,
            imported_at TEXT NOT NULL,
            record_count INTEGER NOT NULL,
            source_hash TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ncm_capitulo ON ncm(capitulo)",
        [],
    )?;

    conn.execute("CREATE INDEX IF NOT EXISTS idx_ncm_setor ON ncm(setor)", [])?;

    Ok(())
}

/// Read a previously generated combined file back into memory, along with
/// the SHA-256 of its bytes (stored with the import run).
pub fn load_combined(path: &Path) -> Result<(Vec<NcmRecord>, String)> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read combined file: {}", path.display()))?;

    let records: Vec<NcmRecord> = serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse combined JSON: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&data);

    Ok((records, format!("{:x}", hasher.finalize())))
}

/// Insert records keyed by NCM. Re-importing replaces existing rows, so the
/// table always mirrors the latest combined file.
pub fn insert_records(conn: &Connection, records: &[NcmRecord]) -> Result<usize> {
    let mut inserted = 0;

    for record in records {
        let anuentes_json = serde_json::to_string(&record.anuentes)?;

        conn.execute(
            "INSERT OR REPLACE INTO ncm (
                ncm, descricao, capitulo, aliquota_ii, aliquota_ipi,
                aliquota_pis, aliquota_cofins, anuentes, requer_lpco,
                setor, fonte_ipi, fonte_ncm
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.ncm,
                record.descricao,
                record.capitulo,
                record.aliquota_ii,
                record.aliquota_ipi,
                record.aliquota_pis,
                record.aliquota_cofins,
                anuentes_json,
                record.requer_lpco,
                record.setor,
                record.fonte_ipi,
                record.fonte_ncm,
            ],
        )?;

        inserted += 1;
    }

    Ok(inserted)
}

/// Record provenance for an import run.
pub fn record_import_run(
    conn: &Connection,
    record_count: usize,
    source_hash: &str,
) -> Result<ImportRun> {
    let run = ImportRun {
        run_id: uuid::Uuid::new_v4().to_string(),
        imported_at: Utc::now().to_rfc3339(),
        record_count,
        source_hash: source_hash.to_string(),
    };

    conn.execute(
        "INSERT INTO import_runs (run_id, imported_at, record_count, source_hash)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            run.run_id,
            run.imported_at,
            run.record_count as i64,
            run.source_hash
        ],
    )?;

    Ok(run)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM ncm", [], |row| row.get(0))?;

    Ok(count)
}

pub fn count_by_setor(conn: &Connection, setor: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ncm WHERE setor = ?1",
        params![setor],
        |row| row.get(0),
    )?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{ALIQUOTA_COFINS, ALIQUOTA_PIS};

    fn record(ncm: &str, setor: &str, anuentes: Vec<&str>) -> NcmRecord {
        NcmRecord {
            ncm: ncm.to_string(),
            descricao: "Teste".to_string(),
            capitulo: ncm.get(..2).unwrap_or("").to_string(),
            aliquota_ii: 14.0,
            aliquota_ipi: 15.0,
            aliquota_pis: ALIQUOTA_PIS,
            aliquota_cofins: ALIQUOTA_COFINS,
            requer_lpco: !anuentes.is_empty(),
            anuentes: anuentes.into_iter().map(String::from).collect(),
            setor: setor.to_string(),
            fonte_ipi: "TIPI".to_string(),
            fonte_ncm: "Siscomex".to_string(),
        }
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_verify_count() {
        let conn = test_conn();
        let records = vec![
            record("85171231", "Eletronicos", vec!["INMETRO", "ANATEL"]),
            record("01012100", "Alimentos", vec!["ANVISA", "MAPA"]),
        ];

        let inserted = insert_records(&conn, &records).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(verify_count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_reimport_is_idempotent_on_count() {
        let conn = test_conn();
        let records = vec![record("85171231", "Eletronicos", vec!["INMETRO"])];

        insert_records(&conn, &records).unwrap();
        insert_records(&conn, &records).unwrap();

        assert_eq!(verify_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_anuentes_stored_as_json() {
        let conn = test_conn();
        insert_records(
            &conn,
            &[record("85171231", "Eletronicos", vec!["INMETRO", "ANATEL"])],
        )
        .unwrap();

        let anuentes_json: String = conn
            .query_row(
                "SELECT anuentes FROM ncm WHERE ncm = ?1",
                params!["85171231"],
                |row| row.get(0),
            )
            .unwrap();

        let anuentes: Vec<String> = serde_json::from_str(&anuentes_json).unwrap();
        assert_eq!(anuentes, vec!["INMETRO", "ANATEL"]);
    }

    #[test]
    fn test_count_by_setor() {
        let conn = test_conn();
        insert_records(
            &conn,
            &[
                record("85171231", "Eletronicos", vec![]),
                record("85285990", "Eletronicos", vec![]),
                record("01012100", "Alimentos", vec![]),
            ],
        )
        .unwrap();

        assert_eq!(count_by_setor(&conn, "Eletronicos").unwrap(), 2);
        assert_eq!(count_by_setor(&conn, "Alimentos").unwrap(), 1);
        assert_eq!(count_by_setor(&conn, "Naval").unwrap(), 0);
    }

    #[test]
    fn test_record_import_run() {
        let conn = test_conn();
        let run = record_import_run(&conn, 42, "abc123").unwrap();

        assert_eq!(run.record_count, 42);
        assert_eq!(run.source_hash, "abc123");
        assert!(!run.run_id.is_empty());

        let stored: i64 = conn
            .query_row(
                "SELECT record_count FROM import_runs WHERE run_id = ?1",
                params![run.run_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, 42);
    }

    #[test]
    fn test_load_combined_roundtrip() {
        let records = vec![record("85171231", "Eletronicos", vec!["INMETRO"])];
        let json = serde_json::to_string_pretty(&records).unwrap();

        let path = std::env::temp_dir().join("ncm_pipeline_test_load.json");
        fs::write(&path, &json).unwrap();

        let (loaded, hash) = load_combined(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].ncm, "85171231");
        assert_eq!(hash.len(), 64);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_combined_missing_file_is_fatal() {
        assert!(load_combined(Path::new("nao_existe.json")).is_err());
    }
}
