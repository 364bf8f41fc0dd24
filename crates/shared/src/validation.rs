//! Common validation utilities.

use validator::ValidationError;

/// Priority labels accepted for tickets and problem categories.
pub const VALID_PRIORIDADES: [&str; 4] = ["Crítica", "Alta", "Normal", "Baixa"];

/// Validates that a priority value is one of the known labels.
pub fn validate_prioridade(prioridade: &str) -> Result<(), ValidationError> {
    if VALID_PRIORIDADES.contains(&prioridade) {
        Ok(())
    } else {
        let mut err = ValidationError::new("prioridade");
        err.message = Some("Prioridade inválida".into());
        Err(err)
    }
}

/// Validates a phone number: digits with optional separators, 8 to 15 digits.
pub fn validate_telefone(telefone: &str) -> Result<(), ValidationError> {
    let digits = telefone.chars().filter(|c| c.is_ascii_digit()).count();
    let only_expected = telefone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '-' | '+'));
    if only_expected && (8..=15).contains(&digits) {
        Ok(())
    } else {
        let mut err = ValidationError::new("telefone");
        err.message = Some("Telefone inválido".into());
        Err(err)
    }
}
