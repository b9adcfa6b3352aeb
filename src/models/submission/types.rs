use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::fields::{null_as_default, string_or_number};

/// Workflow stage of a submission. The wire form is the integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum SubmissionStatus {
    #[default]
    Draft,
    Submitted,
    InReview,
    Approved,
    Rejected,
    Cancelled,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 6] = [
        SubmissionStatus::Draft,
        SubmissionStatus::Submitted,
        SubmissionStatus::InReview,
        SubmissionStatus::Approved,
        SubmissionStatus::Rejected,
        SubmissionStatus::Cancelled,
    ];

    pub fn code(self) -> i64 {
        match self {
            SubmissionStatus::Draft => 0,
            SubmissionStatus::Submitted => 1,
            SubmissionStatus::InReview => 2,
            SubmissionStatus::Approved => 3,
            SubmissionStatus::Rejected => 4,
            SubmissionStatus::Cancelled => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Accepts the Portuguese labels, the English names and numeric text.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Ok(code) = name.parse::<i64>() {
            return Self::from_code(code);
        }
        let folded: String = name
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "rascunho" | "draft" => Some(SubmissionStatus::Draft),
            "enviada" | "enviado" | "submitted" => Some(SubmissionStatus::Submitted),
            "emanalise" | "emanálise" | "inreview" => Some(SubmissionStatus::InReview),
            "aprovada" | "aprovado" | "approved" => Some(SubmissionStatus::Approved),
            "rejeitada" | "rejeitado" | "rejected" => Some(SubmissionStatus::Rejected),
            "cancelada" | "cancelado" | "cancelled" | "canceled" => Some(SubmissionStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "Rascunho",
            SubmissionStatus::Submitted => "Enviada",
            SubmissionStatus::InReview => "Em análise",
            SubmissionStatus::Approved => "Aprovada",
            SubmissionStatus::Rejected => "Rejeitada",
            SubmissionStatus::Cancelled => "Cancelada",
        }
    }

    /// CSS modifier used by the status badge.
    pub fn color(self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "neutral",
            SubmissionStatus::Submitted => "info",
            SubmissionStatus::InReview => "warning",
            SubmissionStatus::Approved => "success",
            SubmissionStatus::Rejected => "danger",
            SubmissionStatus::Cancelled => "muted",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionStatus::Approved | SubmissionStatus::Rejected | SubmissionStatus::Cancelled
        )
    }
}

impl Serialize for SubmissionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for SubmissionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Code(i64),
            Name(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Code(code) => SubmissionStatus::from_code(code)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown status code {code}"))),
            Wire::Name(name) => SubmissionStatus::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown status '{name}'"))),
        }
    }
}

/// One entry of a submission's status history. Produced by the backend;
/// read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryEntry {
    #[serde(alias = "action", deserialize_with = "null_as_default")]
    pub acao: String,
    #[serde(alias = "usuarioNome", alias = "actor")]
    pub usuario: Option<String>,
    #[serde(alias = "dataAcao", alias = "timestamp")]
    pub data: Option<String>,
    #[serde(alias = "comment")]
    pub comentario: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub form_id: i64,
    pub form_name: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub form_version: String,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub status: SubmissionStatus,
    pub data_json: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub versao: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub data_submissao: Option<String>,
    pub data_aprovacao: Option<String>,
    pub motivo_rejeicao: Option<String>,
    pub usuario_aprovador_id: Option<i64>,
    pub usuario_aprovador_nome: Option<String>,
    #[serde(alias = "excluido", alias = "isDeleted", deserialize_with = "null_as_default")]
    pub excluida: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub historicos: Vec<HistoryEntry>,
}

impl Submission {
    /// Field name → value pairs of the submitted data, in key order. Invalid
    /// or missing data yields an empty list.
    pub fn data_fields(&self) -> Vec<(String, String)> {
        let Some(raw) = self.data_json.as_deref() else {
            return Vec::new();
        };
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw) else {
            return Vec::new();
        };
        map.into_iter()
            .map(|(k, v)| {
                let text = match v {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (k, text)
            })
            .collect()
    }

    pub fn display_form_name(&self) -> String {
        match self.form_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Formulário #{}", self.form_id),
        }
    }
}

/// Counts per status returned by `/estatisticas`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionStats {
    #[serde(alias = "totalSubmissoes")]
    pub total: i64,
    pub rascunhos: i64,
    pub enviadas: i64,
    pub em_analise: i64,
    pub aprovadas: i64,
    pub rejeitadas: i64,
    pub canceladas: i64,
}

impl SubmissionStats {
    pub fn awaiting_review(&self) -> i64 {
        self.enviadas + self.em_analise
    }
}

/// Body for creating a submission from a form fill.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub form_id: i64,
    pub data_json: String,
}

/// Body for updating a draft's data. `versao` must be the value last read.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionUpdate {
    pub data_json: String,
    pub versao: i64,
}
