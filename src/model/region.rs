//! Currency and country codes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Currencies that can appear on a statement.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Sgd,
    Myr,
    Inr,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Sgd, Currency::Myr, Currency::Inr];
}

/// Countries whose postal codes we know how to check.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    Us,
    Sg,
    My,
    In,
}

serde_plain::derive_display_from_serialize!(Country);
serde_plain::derive_fromstr_from_deserialize!(Country);

static FIVE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("five digit postal code pattern"));
static SIX_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("six digit postal code pattern"));

impl Country {
    pub const ALL: [Country; 4] = [Country::Us, Country::Sg, Country::My, Country::In];

    /// The pattern a postal code must match in this country.
    pub fn postal_code_pattern(&self) -> &'static Regex {
        match self {
            Country::Us | Country::My => &*FIVE_DIGITS,
            Country::Sg | Country::In => &*SIX_DIGITS,
        }
    }
}
