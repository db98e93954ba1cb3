use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Elapsed-month counts and indices (month 1 is the first operating month)
pub type Months = u32;

/// Decimal places kept on every monthly money amount.
///
/// Rounding each monthly figure once keeps the ledger identities exact under
/// addition and subtraction.
pub const MONEY_DP: u32 = 4;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    KRW,
    USD,
    EUR,
    GBP,
    JPY,
    Other(String),
}

/// The two parties sharing the waterfall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Investor,
    Company,
}

/// Ordered monthly net flows for one party.
///
/// Index 0 is the time of investment (usually the negative initial outlay),
/// index k is month k.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSeries {
    pub party: Party,
    pub flows: Vec<Money>,
}

impl CashFlowSeries {
    pub fn new(party: Party, flows: Vec<Money>) -> Self {
        Self { party, flows }
    }

    /// Amount committed at time 0, positive when the party paid in.
    pub fn initial_investment(&self) -> Money {
        self.flows.first().map(|cf| -*cf).unwrap_or(Decimal::ZERO)
    }

    /// Undiscounted sum of every flow including index 0.
    pub fn total(&self) -> Money {
        self.flows.iter().sum()
    }

    pub fn as_slice(&self) -> &[Money] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
