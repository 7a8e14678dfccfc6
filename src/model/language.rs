use serde::{Deserialize, Serialize};

/// The languages a statement can be rendered in.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
    Ms,
    Ta,
}

serde_plain::derive_display_from_serialize!(Language);
serde_plain::derive_fromstr_from_deserialize!(Language);

impl Language {
    /// Every supported language, in the order they are offered to users.
    pub const ALL: [Language; 4] = [Language::En, Language::Zh, Language::Ms, Language::Ta];
}
