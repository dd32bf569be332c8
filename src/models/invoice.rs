use serde::{Deserialize, Serialize};

/// One request's flat projection of the NF-e fields the DANFE layout reads.
/// Built by the extractor, consumed by the renderer, then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub access_key: String,
    pub issuer: Party,
    pub recipient: Party,
    pub items: Vec<LineItem>,
    pub totals: Totals,
    pub transport: Transport,
    pub additional_info: String,
}

/// A party to the transaction (issuer or recipient)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub cnpj: String,
    pub state_registration: String,
    pub address: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub number: String,
    pub complement: String,
    pub district: String,
    pub municipality: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// One product entry from a `det` element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub code: String,
    pub description: String,
    pub quantity: String, // rendered verbatim next to the unit
    pub unit: String,
    pub unit_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Totals {
    pub products: f64,
    pub invoice: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    pub freight_payer: FreightPayer,
    pub volume_kind: String,
}

/// Which party bears the freight cost.
///
/// `modFrete` is a binary lookup on the wire: code "0" means the issuer pays,
/// any other value means the recipient pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreightPayer {
    Issuer,
    Recipient,
}

impl FreightPayer {
    pub fn from_code(code: &str) -> Self {
        if code == "0" {
            Self::Issuer
        } else {
            Self::Recipient
        }
    }

    /// Role label printed in the transport block
    pub fn role_label(&self) -> &'static str {
        match self {
            Self::Issuer => "Emitente",
            Self::Recipient => "Destinatário",
        }
    }
}
