// 🔢 NCM Normalization - shared helpers for both source parsers

/// Normalize an NCM code to its canonical 8-character form.
///
/// Source documents write codes with dot separators ("8517.12.31") or at
/// partial depth ("8517"). Separators and whitespace are stripped, short
/// codes are right-padded with '0', long ones truncated to 8.
///
/// Returns an empty string for empty input. Digit-only validation is the
/// caller's job (see `is_valid_ncm`).
pub fn normalize_ncm(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut ncm: Vec<char> = raw
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect();

    while ncm.len() < 8 {
        ncm.push('0');
    }
    ncm.truncate(8);

    ncm.into_iter().collect()
}

/// A usable NCM is exactly 8 ASCII digits.
pub fn is_valid_ncm(ncm: &str) -> bool {
    ncm.len() == 8 && ncm.bytes().all(|b| b.is_ascii_digit())
}

/// Parse an alíquota cell permissively.
///
/// The TIPI mixes plain numbers ("7"), percent strings ("12,5%") and
/// placeholders ("N/D", empty). Anything unparsable resolves to 0.0 — a bad
/// rate is never an error.
pub fn parse_aliquota(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let s = s.replace('%', "").replace(',', ".");
    s.trim().parse::<f64>().unwrap_or(0.0)
}

/// Truncate a description to at most 500 characters (char count, so
/// accented text is never split mid-character).
pub fn truncate_descricao(descricao: &str) -> String {
    descricao.chars().take(500).collect()
}

// ============================================================================
// TESTS
// ============================================================================
