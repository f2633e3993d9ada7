use serde::{Deserialize, Serialize};

/// The seven USD majors. Anything else is a cross or an exotic.
pub const MAJOR_PAIRS: &[&str] = &[
    "EUR/USD", "GBP/USD", "USD/JPY", "USD/CHF", "AUD/USD", "USD/CAD", "NZD/USD",
];

/// Errors produced when parsing a pair symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairError {
    /// Symbol did not contain two three-letter currency codes.
    Malformed { raw: String },
    /// Base and quote are the same currency.
    SameCurrency { raw: String },
}

impl std::fmt::Display for PairError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { raw } => {
                write!(f, "pair symbol '{raw}' is not BASE/QUOTE (e.g. EUR/USD)")
            }
            Self::SameCurrency { raw } => {
                write!(f, "pair symbol '{raw}' has identical base and quote")
            }
        }
    }
}

impl std::error::Error for PairError {}

/// Canonical currency pair, always stored as upper-case `BASE/QUOTE`.
///
/// Accepts `EUR/USD`, `EUR_USD`, `EURUSD` and lower-case variants on input.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair(String);

impl Pair {
    pub fn parse(raw: &str) -> Result<Self, PairError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.len() != 6 {
            return Err(PairError::Malformed {
                raw: raw.to_string(),
            });
        }

        let (base, quote) = cleaned.split_at(3);
        if base == quote {
            return Err(PairError::SameCurrency {
                raw: raw.to_string(),
            });
        }

        Ok(Self(format!("{base}/{quote}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn base(&self) -> &str {
        &self.0[..3]
    }

    pub fn quote(&self) -> &str {
        &self.0[4..]
    }

    pub fn is_jpy_quoted(&self) -> bool {
        self.quote() == "JPY"
    }

    /// Price delta → pips multiplier: 100 for JPY-quoted pairs, else 10,000.
    pub fn pip_factor(&self) -> f64 {
        if self.is_jpy_quoted() {
            100.0
        } else {
            10_000.0
        }
    }

    /// Price distance of one pip.
    pub fn pip_size(&self) -> f64 {
        1.0 / self.pip_factor()
    }

    pub fn is_major(&self) -> bool {
        MAJOR_PAIRS.contains(&self.0.as_str())
    }

    /// Convert a raw price delta to pips.
    pub fn to_pips(&self, price_delta: f64) -> f64 {
        price_delta * self.pip_factor()
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Pair {
    type Err = PairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pair::parse(s)
    }
}

impl TryFrom<String> for Pair {
    type Error = PairError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pair::parse(&value)
    }
}

impl From<Pair> for String {
    fn from(p: Pair) -> Self {
        p.0
    }
}
