// 🏷️ NCM Classifier - setor, anuentes e alíquota II estimada
//
// Pure lookup/keyword logic. Every input resolves to a deterministic
// default; nothing here can fail.

/// Capítulo (first 2 digits) → setor. Chapters absent from the table map to
/// "Outros".
const SETOR_POR_CAPITULO: &[(&str, &str)] = &[
    // Alimentos e bebidas
    ("01", "Alimentos"),
    ("02", "Alimentos"),
    ("03", "Alimentos"),
    ("04", "Alimentos"),
    ("05", "Alimentos"),
    ("06", "Alimentos"),
    ("07", "Alimentos"),
    ("08", "Alimentos"),
    ("09", "Alimentos"),
    ("10", "Alimentos"),
    ("11", "Alimentos"),
    ("12", "Alimentos"),
    ("13", "Alimentos"),
    ("14", "Alimentos"),
    ("15", "Alimentos"),
    ("16", "Alimentos"),
    ("17", "Alimentos"),
    ("18", "Alimentos"),
    ("19", "Alimentos"),
    ("20", "Alimentos"),
    ("21", "Alimentos"),
    ("22", "Bebidas"),
    ("23", "Alimentos"),
    ("24", "Tabaco"),
    // Químicos e minerais
    ("25", "Quimicos"),
    ("26", "Minerais"),
    ("27", "Combustiveis"),
    ("28", "Quimicos"),
    ("29", "Quimicos"),
    ("30", "Farmaceuticos"),
    ("31", "Fertilizantes"),
    ("32", "Quimicos"),
    ("33", "Cosmeticos"),
    ("34", "Quimicos"),
    ("35", "Quimicos"),
    ("36", "Explosivos"),
    ("37", "Fotograficos"),
    ("38", "Quimicos"),
    // Plásticos e borracha
    ("39", "Plasticos"),
    ("40", "Borracha"),
    // Couros, madeira e papel
    ("41", "Couro"),
    ("42", "Couro"),
    ("43", "Peleteria"),
    ("44", "Madeira"),
    ("45", "Cortica"),
    ("46", "Cestaria"),
    ("47", "Papel"),
    ("48", "Papel"),
    ("49", "Papel"),
    // Têxteis e vestuário
    ("50", "Textil"),
    ("51", "Textil"),
    ("52", "Textil"),
    ("53", "Textil"),
    ("54", "Textil"),
    ("55", "Textil"),
    ("56", "Textil"),
    ("57", "Textil"),
    ("58", "Textil"),
    ("59", "Textil"),
    ("60", "Textil"),
    ("61", "Vestuario"),
    ("62", "Vestuario"),
    ("63", "Textil"),
    // Calçados e acessórios
    ("64", "Calcados"),
    ("65", "Chapeus"),
    ("66", "Guarda-chuvas"),
    ("67", "Penas"),
    // Minerais e metais
    ("68", "Minerais"),
    ("69", "Ceramicas"),
    ("70", "Vidro"),
    ("71", "Joias"),
    ("72", "Metais"),
    ("73", "Metais"),
    ("74", "Cobre"),
    ("75", "Niquel"),
    ("76", "Aluminio"),
    ("78", "Chumbo"),
    ("79", "Zinco"),
    ("80", "Estanho"),
    ("81", "Metais"),
    ("82", "Ferramentas"),
    ("83", "Metais"),
    // Máquinas e veículos
    ("84", "Maquinas"),
    ("85", "Eletronicos"),
    ("86", "Ferroviario"),
    ("87", "Autopecas"),
    ("88", "Aeronautica"),
    ("89", "Naval"),
    // Instrumentos
    ("90", "Instrumentos"),
    ("91", "Relogios"),
    ("92", "Instrumentos_Musicais"),
    // Outros
    ("93", "Armas"),
    ("94", "Moveis"),
    ("95", "Brinquedos"),
    ("96", "Diversos"),
    ("97", "Arte"),
    ("99", "Diversos"),
];

/// Keyword refinements over the lowercased description. Evaluated in order;
/// only the first matching group replaces the chapter-derived setor.
const REFINAMENTOS_POR_DESCRICAO: &[(&[&str], &str)] = &[
    (&["smartphone", "celular", "telefone"], "Eletronicos"),
    (&["computador", "notebook", "laptop"], "Eletronicos"),
    (&["medicamento", "farmac"], "Farmaceuticos"),
    (&["cosmetic", "perfum"], "Cosmeticos"),
    (&["automovel", "veiculo"], "Autopecas"),
];

/// Capítulos agropecuários sob fiscalização do MAPA.
const CAPITULOS_AGRO: &[&str] = &[
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
];

/// Alíquota média de II por setor (aproximação; a fonte real seria a TEC).
const ALIQUOTA_II_POR_SETOR: &[(&str, f64)] = &[
    ("Eletronicos", 14.0),
    ("Autopecas", 18.0),
    ("Maquinas", 14.0),
    ("Textil", 35.0),
    ("Vestuario", 35.0),
    ("Calcados", 35.0),
    ("Quimicos", 12.0),
    ("Farmaceuticos", 8.0),
    ("Cosmeticos", 18.0),
    ("Alimentos", 14.0),
    ("Bebidas", 20.0),
    ("Brinquedos", 20.0),
    ("Metais", 12.0),
    ("Plasticos", 14.0),
    ("Moveis", 16.0),
    ("Papel", 12.0),
    ("Instrumentos", 14.0),
];

/// Default II rate for setores not in the table.
pub const ALIQUOTA_II_PADRAO: f64 = 14.0;

/// Chapter prefix of a code (first 2 characters).
pub fn capitulo(ncm: &str) -> &str {
    ncm.get(..2).unwrap_or("")
}

/// Detect the industry setor from the NCM chapter, refined by description
/// keywords.
pub fn detect_setor(ncm: &str, descricao: &str) -> String {
    let cap = capitulo(ncm);
    let desc = descricao.to_lowercase();

    let mut setor = SETOR_POR_CAPITULO
        .iter()
        .find(|(c, _)| *c == cap)
        .map(|(_, s)| *s)
        .unwrap_or("Outros");

    for &(keywords, refinado) in REFINAMENTOS_POR_DESCRICAO {
        if contains_any(&desc, keywords) {
            setor = refinado;
            break;
        }
    }

    setor.to_string()
}

/// Detect the anuentes (regulatory clearance agencies) required for an NCM.
///
/// Rules are independent and evaluated in fixed order; the result is an
/// ordered list without duplicates (insertion order = detection order).
pub fn detect_anuentes(ncm: &str, descricao: &str, setor: &str) -> Vec<String> {
    let mut anuentes: Vec<String> = Vec::new();
    let cap = capitulo(ncm);
    let desc = descricao.to_lowercase();

    // ANVISA - produtos de saúde, alimentos, cosméticos
    if matches!(setor, "Farmaceuticos" | "Cosmeticos" | "Alimentos" | "Bebidas")
        || contains_any(&desc, &["medicamento", "farmac", "vacina", "soro", "sangue"])
    {
        push_anuente(&mut anuentes, "ANVISA");
    }

    // MAPA - produtos agropecuários
    if matches!(setor, "Alimentos" | "Fertilizantes") || CAPITULOS_AGRO.contains(&cap) {
        push_anuente(&mut anuentes, "MAPA");
    }

    // IBAMA - produtos com impacto ambiental
    if matches!(setor, "Quimicos" | "Madeira")
        || contains_any(&desc, &["agrotox", "pestici", "herbici"])
    {
        push_anuente(&mut anuentes, "IBAMA");
    }

    // INMETRO - certificação obrigatória
    if matches!(setor, "Eletronicos" | "Autopecas" | "Brinquedos") {
        push_anuente(&mut anuentes, "INMETRO");
    }

    // ANATEL - telecomunicações
    if setor == "Eletronicos"
        && contains_any(
            &desc,
            &["telefone", "celular", "radio", "transmissor", "wifi", "bluetooth"],
        )
    {
        push_anuente(&mut anuentes, "ANATEL");
    }

    // Exército - armas e explosivos
    if matches!(setor, "Armas" | "Explosivos") {
        push_anuente(&mut anuentes, "EXERCITO");
    }

    // ANP - combustíveis
    if setor == "Combustiveis" {
        push_anuente(&mut anuentes, "ANP");
    }

    anuentes
}

/// Estimate the import-duty (II) rate for a setor. Always an estimate, never
/// derived from a declared rate.
pub fn estimate_ii_rate(setor: &str) -> f64 {
    ALIQUOTA_II_POR_SETOR
        .iter()
        .find(|(s, _)| *s == setor)
        .map(|(_, rate)| *rate)
        .unwrap_or(ALIQUOTA_II_PADRAO)
}

fn contains_any(desc: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| desc.contains(k))
}

fn push_anuente(anuentes: &mut Vec<String>, sigla: &str) {
    if !anuentes.iter().any(|a| a == sigla) {
        anuentes.push(sigla.to_string());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Setor
    // ------------------------------------------------------------------------

    #[test]
    fn test_setor_by_chapter() {
        assert_eq!(detect_setor("85171231", ""), "Eletronicos");
        assert_eq!(detect_setor("01012100", ""), "Alimentos");
        assert_eq!(detect_setor("22030000", ""), "Bebidas");
        assert_eq!(detect_setor("30049069", ""), "Farmaceuticos");
        assert_eq!(detect_setor("87032310", ""), "Autopecas");
        assert_eq!(detect_setor("93020000", ""), "Armas");
    }

    #[test]
    fn test_setor_unknown_chapter_is_outros() {
        assert_eq!(detect_setor("77010000", ""), "Outros");
        assert_eq!(detect_setor("98010000", ""), "Outros");
        assert_eq!(detect_setor("", ""), "Outros");
    }

    #[test]
    fn test_setor_keyword_override() {
        // Chapter 39 is Plasticos, but a phone case described as "celular"
        // gets refined to Eletronicos
        assert_eq!(detect_setor("39269090", "Capas para celular"), "Eletronicos");
        assert_eq!(detect_setor("84713012", "Notebooks e laptops"), "Eletronicos");
        assert_eq!(detect_setor("21069090", "Suplemento farmacêutico"), "Farmaceuticos");
        assert_eq!(detect_setor("34013000", "Perfumes finos"), "Cosmeticos");
        assert_eq!(detect_setor("40112000", "Pneus para veiculos"), "Autopecas");
    }

    #[test]
    fn test_setor_override_first_match_only() {
        // "celular" (group 1) wins over "medicamento" (group 3)
        assert_eq!(
            detect_setor("30049069", "Medicamento em embalagem com celular"),
            "Eletronicos"
        );
    }

    #[test]
    fn test_setor_override_is_case_insensitive() {
        assert_eq!(detect_setor("39269090", "CELULAR Smartphone"), "Eletronicos");
    }

    // ------------------------------------------------------------------------
    // Anuentes
    // ------------------------------------------------------------------------

    #[test]
    fn test_anuentes_eletronico_com_telecom() {
        let setor = detect_setor("85171231", "Telefones celulares com wifi");
        assert_eq!(setor, "Eletronicos");

        let anuentes = detect_anuentes("85171231", "Telefones celulares com wifi", &setor);
        assert_eq!(anuentes, vec!["INMETRO", "ANATEL"]);
    }

    #[test]
    fn test_anuentes_eletronico_sem_telecom() {
        let anuentes = detect_anuentes("85285990", "Monitores de vídeo", "Eletronicos");
        assert_eq!(anuentes, vec!["INMETRO"]);
    }

    #[test]
    fn test_anuentes_alimentos_anvisa_e_mapa() {
        let anuentes = detect_anuentes("02013000", "Carnes bovinas", "Alimentos");
        assert_eq!(anuentes, vec!["ANVISA", "MAPA"]);
    }

    #[test]
    fn test_anuentes_capitulo_agro_sem_setor_alimentos() {
        // Chapter 06 (plantas vivas) is Alimentos by table, but even a
        // refined setor keeps MAPA through the chapter rule
        let anuentes = detect_anuentes("06029090", "Mudas de plantas", "Outros");
        assert_eq!(anuentes, vec!["MAPA"]);
    }

    #[test]
    fn test_anuentes_anvisa_por_palavra_chave() {
        let anuentes = detect_anuentes("38220000", "Reagente com soro animal", "Quimicos");
        assert_eq!(anuentes, vec!["ANVISA", "IBAMA"]);
    }

    #[test]
    fn test_anuentes_ibama_por_palavra_chave() {
        let anuentes = detect_anuentes("96035000", "Aplicador de herbicida", "Diversos");
        assert_eq!(anuentes, vec!["IBAMA"]);
    }

    #[test]
    fn test_anuentes_exercito_e_anp() {
        assert_eq!(detect_anuentes("93020000", "", "Armas"), vec!["EXERCITO"]);
        assert_eq!(detect_anuentes("27101259", "", "Combustiveis"), vec!["ANP"]);
    }

    #[test]
    fn test_anuentes_sem_duplicatas() {
        // Farmaceuticos setor + "medicamento" keyword both imply ANVISA
        let anuentes = detect_anuentes("30049069", "Outros medicamentos", "Farmaceuticos");
        assert_eq!(anuentes.iter().filter(|a| *a == "ANVISA").count(), 1);
    }

    #[test]
    fn test_anuentes_vazio() {
        let anuentes = detect_anuentes("72085100", "Chapas de aço", "Metais");
        assert!(anuentes.is_empty());
    }

    // ------------------------------------------------------------------------
    // Alíquota II
    // ------------------------------------------------------------------------

    #[test]
    fn test_ii_rate_by_setor() {
        assert_eq!(estimate_ii_rate("Eletronicos"), 14.0);
        assert_eq!(estimate_ii_rate("Textil"), 35.0);
        assert_eq!(estimate_ii_rate("Farmaceuticos"), 8.0);
        assert_eq!(estimate_ii_rate("Bebidas"), 20.0);
    }

    #[test]
    fn test_ii_rate_default() {
        assert_eq!(estimate_ii_rate("Outros"), ALIQUOTA_II_PADRAO);
        assert_eq!(estimate_ii_rate("Naval"), 14.0);
        assert_eq!(estimate_ii_rate(""), 14.0);
    }

    #[test]
    fn test_capitulo() {
        assert_eq!(capitulo("85171231"), "85");
        assert_eq!(capitulo(""), "");
    }
}
