use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;
use std::path::PathBuf;

use ncm_pipeline::{
    combine, insert_records, load_combined, parse_siscomex, parse_tipi, print_amostra,
    record_import_run, setup_database, verify_count, write_output, Estatisticas,
};

// Sources and output live next to the executable
const TIPI_FILE: &str = "tipi.csv";
const SISCOMEX_FILE: &str = "ncm_siscomex.json";
const OUTPUT_FILE: &str = "ncm_completo.json";
const DB_FILE: &str = "ncm.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "import" {
        // Import mode: load the combined file into SQLite
        run_import()?;
    } else {
        // Pipeline mode (default)
        run_pipeline()?;
    }

    Ok(())
}

fn base_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("Failed to resolve executable path")?;

    Ok(exe
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

fn run_pipeline() -> Result<()> {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🔗 Combinando dados TIPI + Siscomex");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Início: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    let base = base_dir()?;
    let tipi_path = base.join(TIPI_FILE);
    let siscomex_path = base.join(SISCOMEX_FILE);
    let output_path = base.join(OUTPUT_FILE);

    // 1. Parse TIPI
    println!("\n📂 Lendo TIPI: {}", tipi_path.display());
    let tipi = parse_tipi(&tipi_path)?;
    println!("✓ NCMs válidos no TIPI: {}", tipi.len());

    // 2. Parse Siscomex
    println!("\n📂 Lendo Siscomex: {}", siscomex_path.display());
    let siscomex = parse_siscomex(&siscomex_path)?;
    println!("✓ NCMs válidos no Siscomex: {}", siscomex.len());

    // 3. Combine
    println!("\n🔗 Combinando fontes...");
    let records = combine(&tipi, &siscomex);
    println!("✓ Total de NCMs únicos: {}", records.len());

    // 4. Statistics
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("ESTATÍSTICAS");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    let stats = Estatisticas::compute(&records);
    stats.print();

    // 5. Write output
    println!("\n💾 Salvando em: {}", output_path.display());
    let hash = write_output(&output_path, &records)?;
    println!("✓ Arquivo salvo com {} NCMs", records.len());
    println!("✓ sha256: {}", hash);

    // 6. Sample
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("AMOSTRA (5 primeiros)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_amostra(&records, 5);

    Ok(())
}

fn run_import() -> Result<()> {
    println!("🗄️  Importação: ncm_completo.json → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let base = base_dir()?;
    let combined_path = base.join(OUTPUT_FILE);
    let db_path = base.join(DB_FILE);

    if !combined_path.exists() {
        eprintln!("❌ Arquivo combinado não encontrado: {}", combined_path.display());
        eprintln!("   Execute primeiro: ncm-pipeline");
        eprintln!("   para gerar o arquivo combinado.");
        std::process::exit(1);
    }

    // 1. Load combined file
    println!("\n📂 Lendo {}", combined_path.display());
    let (records, source_hash) = load_combined(&combined_path)?;
    println!("✓ {} NCMs no arquivo", records.len());

    // 2. Setup database
    println!("\n🔧 Preparando banco: {}", db_path.display());
    let conn = Connection::open(&db_path)?;
    setup_database(&conn)?;
    println!("✓ Banco inicializado com WAL");

    // 3. Insert records
    println!("\n💾 Inserindo NCMs...");
    let inserted = insert_records(&conn, &records)?;
    println!("✓ Inseridos: {} NCMs", inserted);

    // 4. Record provenance + verify
    let run = record_import_run(&conn, inserted, &source_hash)?;
    println!("✓ Import run registrado: {}", run.run_id);

    let count = verify_count(&conn)?;
    println!("\n🔍 Banco contém {} NCMs", count);

    Ok(())
}
