use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw contact form body as it arrives from the landing page.
///
/// Every field is optional here so a missing field surfaces as a validation
/// error listing what is missing, not as a JSON decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "empresa")]
    pub company: Option<String>,
    #[serde(rename = "faturamento")]
    pub revenue_bracket: Option<String>,
    #[serde(rename = "mensagem")]
    pub message: Option<String>,
}

/// A validated contact, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContact {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "faturamento")]
    pub revenue_bracket: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    /// Assigned by the server when the submission is accepted.
    #[serde(rename = "data")]
    pub submitted_at: DateTime<Utc>,
}

/// A contact as persisted by the durable store. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredContact {
    pub id: i64,
    #[serde(flatten)]
    pub contact: NewContact,
}

impl StoredContact {
    /// Spreadsheet row, in the column order of the contacts sheet (A:G).
    pub fn sheet_row(&self) -> Vec<String> {
        let c = &self.contact;
        vec![
            c.name.clone(),
            c.email.clone(),
            c.phone.clone(),
            c.company.clone(),
            c.revenue_bracket.clone(),
            c.message.clone(),
            c.submitted_at.to_rfc3339(),
        ]
    }
}
