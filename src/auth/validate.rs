//! Form input checks run before anything is sent to the backend. Each
//! returns `Some(message)` on failure.

pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("E-mail é obrigatório.".to_string());
    }
    if trimmed.len() > 254 {
        return Some("E-mail deve ter no máximo 254 caracteres.".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Informe um e-mail válido.".to_string()),
    }
}

pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Senha é obrigatória.".to_string());
    }
    if password.chars().count() < 6 {
        return Some("A senha deve ter pelo menos 6 caracteres.".to_string());
    }
    None
}

pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} é obrigatório."));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} deve ter no máximo {max_len} caracteres."));
    }
    None
}

/// Schema text must be a JSON object.
pub fn validate_schema_json(raw: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) if value.is_object() => None,
        Ok(_) => Some("O schema deve ser um objeto JSON.".to_string()),
        Err(e) => Some(format!("Schema JSON inválido: {e}")),
    }
}

/// Collect every failing check.
pub fn collect(checks: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    checks.into_iter().flatten().collect()
}
