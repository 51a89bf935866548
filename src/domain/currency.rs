use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::HashMap;

/// Currency in which balances are stored.
pub const BASE_CURRENCY: &str = "RUB";

/// Conversion rates keyed by upper-case currency code, expressed as units of
/// that currency per one base unit. The base currency is always present at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTable {
    rates: HashMap<String, Decimal>,
}

impl ConversionTable {
    pub fn new(rates: HashMap<String, Decimal>) -> Self {
        let mut rates: HashMap<String, Decimal> = rates
            .into_iter()
            .map(|(code, rate)| (code.trim().to_ascii_uppercase(), rate))
            .collect();
        rates.insert(BASE_CURRENCY.to_string(), dec!(1));
        Self { rates }
    }

    pub fn base_only() -> Self {
        Self::new(HashMap::new())
    }

    pub fn rate(&self, code: &str) -> Option<Decimal> {
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::base_only()
    }
}

/// Wire shape served by the rates provider: `{"rates": {"USD": 0.013, ...}}`.
#[derive(Debug, Deserialize)]
pub struct RatesPayload {
    pub rates: HashMap<String, Decimal>,
}

impl From<RatesPayload> for ConversionTable {
    fn from(payload: RatesPayload) -> Self {
        Self::new(payload.rates)
    }
}
