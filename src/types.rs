use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bill (proyecto de ley) as listed in search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// `None` when the row came without a bill number; such rows cannot be opened
    pub number: Option<u64>,
    /// Official identifier, e.g. "10383/2024-CR"
    pub code: String,
    pub status: String,
    pub filed_on: Option<NaiveDate>,
    pub title: String,
    pub proponent: String,
    pub authors: String,
}

/// Congress member (congresista)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub party: String,
    pub email: String,
}

/// Bill with its full record and signers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDetail {
    pub number: u64,
    pub title: String,
    pub status: String,
    pub filed_on: Option<NaiveDate>,
    pub proponent: String,
    pub parliamentary_group: String,
    pub summary: String,
    pub signers: Vec<Signer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signer {
    pub name: String,
    pub dni: String,
    pub sex: Sex,
    pub web_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "M" | "m" => Sex::Male,
            "F" | "f" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "♂"),
            Sex::Female => write!(f, "♀"),
            Sex::Unknown => write!(f, "-"),
        }
    }
}

/// Fixed filters sent with every bill search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillFilter {
    pub period_id: u32,
    pub filed_from: Option<NaiveDate>,
    pub filed_to: Option<NaiveDate>,
}
