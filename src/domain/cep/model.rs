use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Postal address resolved from a CEP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    /// Eight digits, no hyphen
    pub cep: String,
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub ibge: String,
    pub ddd: String,
}

/// Listing filter for stored addresses
#[derive(Debug, Clone, Default)]
pub struct CepFilter {
    pub uf: Option<String>,
    pub localidade: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// Normalize a numeric CEP to eight zero-padded digits.
///
/// Returns `None` outside `1..=99_999_999`.
pub fn normalize_cep(value: i64) -> Option<String> {
    if (1..=99_999_999).contains(&value) {
        Some(format!("{value:08}"))
    } else {
        None
    }
}

/// Accepts `01001000` or `01001-000`.
pub fn parse_cep(value: &str) -> Option<String> {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cep_is_zero_padded() {
        assert_eq!(normalize_cep(1001000).as_deref(), Some("01001000"));
        assert_eq!(normalize_cep(99_999_999).as_deref(), Some("99999999"));
        assert_eq!(normalize_cep(0), None);
        assert_eq!(normalize_cep(100_000_000), None);
    }

    #[test]
    fn textual_cep_accepts_hyphen() {
        assert_eq!(parse_cep("01001-000").as_deref(), Some("01001000"));
        assert_eq!(parse_cep("0100100"), None);
        assert_eq!(parse_cep("0100100a"), None);
    }
}
