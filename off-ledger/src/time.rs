use scrypto::prelude::*;

use crate::error::MarketError;

/// Seconds remaining until the market's maturity date.
///
/// A market at or past maturity is not quotable: once maturity lapses
/// PT redeems 1:1 and the curve is meaningless, so this returns
/// [`MarketError::Expired`] instead of a zero or fallback period. This
/// is the single place the expiry check happens; everything downstream
/// receives a strictly positive time to expiry.
pub fn time_to_expiry(
    maturity_date: &UtcDateTime,
    now: Instant,
) -> Result<i64, MarketError> {
    seconds_to_expiry(maturity_date.to_instant(), now)
}

/// [`time_to_expiry`] over raw instants.
pub fn seconds_to_expiry(maturity: Instant, now: Instant) -> Result<i64, MarketError> {
    let time_to_expiry =
        maturity.seconds_since_unix_epoch - now.seconds_since_unix_epoch;

    if time_to_expiry <= 0 {
        return Err(MarketError::Expired);
    }

    Ok(time_to_expiry)
}
