// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "pt";

// Mensagens de erro exibidas ao usuário, por idioma.
const MESSAGES: &[(&str, &str, &str)] = &[
    // (chave, pt, en)
    ("validation", "Um ou mais campos são inválidos.", "One or more fields are invalid."),
    ("invalid_credentials", "E-mail ou senha inválidos.", "Invalid e-mail or password."),
    ("invalid_token", "Token de autenticação inválido ou ausente.", "Missing or invalid authentication token."),
    ("authentication_required", "É necessário entrar no sistema.", "Authentication is required."),
    ("authorization_denied", "Você precisa da permissão '{}' para realizar esta ação.", "You need the '{}' permission to perform this action."),
    ("route_denied", "Você não tem acesso a '{}'.", "You do not have access to '{}'."),
    ("not_found", "Registro não encontrado: {}.", "Record not found: {}."),
    ("backend_unavailable", "Não foi possível contatar o servidor. Tente novamente.", "Could not reach the server. Please try again."),
    ("report_failed", "Falha ao gerar o relatório.", "Failed to generate the report."),
    ("internal", "Ocorreu um erro inesperado.", "An unexpected error occurred."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    // chave -> (pt, en)
    messages: HashMap<&'static str, (&'static str, &'static str)>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let messages = MESSAGES
            .iter()
            .map(|(key, pt, en)| (*key, (*pt, *en)))
            .collect();
        Self { messages }
    }

    /// Idiomas sem tradução caem para o português.
    pub fn get(&self, lang: &str, key: &str) -> &'static str {
        match self.messages.get(key) {
            Some((_, en)) if lang == "en" => *en,
            Some((pt, _)) => *pt,
            None => "Ocorreu um erro inesperado.",
        }
    }

    pub fn format(&self, lang: &str, key: &str, arg: &str) -> String {
        self.get(lang, key).replacen("{}", arg, 1)
    }
}
