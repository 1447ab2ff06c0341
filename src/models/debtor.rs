//! Debtor (customer) model.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityType, HasKeyStr, HasRowId};

/// A debtor account.
///
/// Debtors are keyed by their account number, which the ERP exposes as the
/// record's key string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Debtor {
    /// Row id.
    pub row_id: i32,

    /// Account number.
    #[serde(rename = "KeyStr", alias = "Account")]
    pub account: String,

    /// Debtor name.
    #[serde(default)]
    pub name: String,

    /// Primary contact e-mail.
    #[serde(default)]
    pub contact_email: Option<String>,

    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,

    /// City.
    #[serde(default)]
    pub city: Option<String>,

    /// Country code.
    #[serde(default)]
    pub country: Option<String>,

    /// Currency code, when it differs from the company currency.
    #[serde(default)]
    pub currency: Option<String>,

    /// VAT registration number.
    #[serde(default)]
    pub vat_number: Option<String>,

    /// Whether the account is blocked for new orders.
    #[serde(default)]
    pub blocked: bool,
}

impl Debtor {
    /// Get the account number (alias for the key string).
    pub fn account(&self) -> &str {
        &self.account
    }
}

impl Entity for Debtor {
    const ENTITY_TYPE: EntityType = EntityType::new("Debtor");
}

impl HasRowId for Debtor {
    fn row_id(&self) -> i32 {
        self.row_id
    }
}

impl HasKeyStr for Debtor {
    fn key_str(&self) -> &str {
        &self.account
    }
}
