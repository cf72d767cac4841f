use scrypto::prelude::*;
use thiserror::Error;

/// Domain violations surfaced while pricing a trade. All of these are
/// synchronous and non-retryable: the engine is pure, so retrying with
/// the same inputs is meaningless. The caller translates them into a
/// user-facing message and refuses to build a settlement manifest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// The pool proportion left the open interval (0, 1): reserves are
    /// exhausted or the trade is larger than the available liquidity.
    #[error("Proportion must be between 0 and 1. Proportion: {0}")]
    DegenerateProportion(Decimal),
    /// The curve-implied exchange rate (pre-fee, post-fee or last
    /// recorded) does not exceed 1, violating the time value of the
    /// principal token.
    #[error("Exchange rate must be greater than 1. Exchange rate: {0}")]
    NonInvertibleRate(PreciseDecimal),
    #[error("Combined pool reserves cannot be zero")]
    ZeroDenominator,
    #[error("Market has reached its maturity")]
    Expired,
    #[error("Trade is larger than the market's capacity. Proportion: {0}")]
    MaxMarketProportionReached(Decimal),
    #[error("Unable to approximate trade size within {0} iterations")]
    ApproxExhausted(u32),
    #[error("Arithmetic error: {0}")]
    ArithmeticError(&'static str),
}
