use scrypto::prelude::*;
use scrypto_math::*;

use crate::error::MarketError;

/// 365 days in seconds
pub const PERIOD_SIZE: Decimal = dec!(31536000);

/// Calculates the size of the trade in relation
/// to pool size in terms of PT sent or receiving.
///
/// A zero `net_pt_amount` gives the pool's resting proportion.
pub fn calc_proportion(
    net_pt_amount: Decimal,
    total_pt: Decimal,
    total_asset: Decimal,
) -> Result<Decimal, MarketError> {
    let numerator = total_pt
        .checked_sub(net_pt_amount)
        .ok_or(MarketError::ArithmeticError("proportion numerator"))?;

    let denominator = total_pt
        .checked_add(total_asset)
        .ok_or(MarketError::ArithmeticError("proportion denominator"))?;

    if denominator == Decimal::ZERO {
        return Err(MarketError::ZeroDenominator);
    }

    numerator
        .checked_div(denominator)
        .ok_or(MarketError::ArithmeticError("proportion division"))
}

/// Natural log of the odds of the proportion, `ln(p / (1 - p))`.
///
/// The curve is only defined for 0 < p < 1. At p = 0 the pool holds no
/// PT to price, at p = 1 it holds no asset; either way there is no
/// liquidity on one side and the logit is undefined, so the trade is
/// rejected rather than priced.
pub fn log_proportion(proportion: Decimal) -> Result<PreciseDecimal, MarketError> {
    if proportion <= Decimal::ZERO || proportion >= Decimal::ONE {
        return Err(MarketError::DegenerateProportion(proportion));
    }

    let proportion = PreciseDecimal::from(proportion);

    let logit_p = proportion
        .checked_div(
            PreciseDecimal::ONE
                .checked_sub(proportion)
                .ok_or(MarketError::ArithmeticError("logit denominator"))?,
        )
        .ok_or(MarketError::ArithmeticError("logit division"))?;

    logit_p
        .ln()
        .ok_or(MarketError::ArithmeticError("logit log"))
}

/// Calculates the scalar rate as a function of time to maturity.
/// The scalar rate determines the steepness of the curve. A higher
/// scalar rate flattens the curve (less slippage) while a lower scalar
/// rate steepens the curve (more slippage). It is based on an initial
/// immutable scalar root value. As the market matures, the scalar rate
/// increases, which ultimately flattens the curve over time.
pub fn calc_rate_scalar(
    scalar_root: Decimal,
    time_to_expiry: i64,
) -> Result<Decimal, MarketError> {
    let time_to_expiry = time_to_expiry.max(1);

    let rate_scalar = scalar_root
        .checked_mul(PERIOD_SIZE)
        .and_then(|result| result.checked_div(Decimal::from(time_to_expiry)))
        .ok_or(MarketError::ArithmeticError("rate scalar"))?;

    if rate_scalar <= Decimal::ZERO {
        return Err(MarketError::ArithmeticError("rate scalar must be positive"));
    }

    Ok(rate_scalar)
}

/// Calculates the rate anchor.
/// The rate anchor determines where the curve starts and where exchange
/// rates are initially anchored (and ultimately the implied rate of the
/// market). E.g: a rate anchor of 1.05 means that the exchange rate will
/// be around ~1.05 pending other factors such as the rate scalar, size
/// of the trade, and fees.
pub fn calc_rate_anchor(
    last_ln_implied_rate: PreciseDecimal,
    proportion: Decimal,
    time_to_expiry: i64,
    rate_scalar: Decimal,
) -> Result<PreciseDecimal, MarketError> {
    let last_exchange_rate =
        calc_exchange_rate_from_implied_rate(last_ln_implied_rate, time_to_expiry)?;

    // Exchange rate always needs to be greater than one.
    if last_exchange_rate <= PreciseDecimal::ONE {
        return Err(MarketError::NonInvertibleRate(last_exchange_rate));
    }

    let ln_proportion = log_proportion(proportion)?;

    let new_exchange_rate = ln_proportion
        .checked_div(PreciseDecimal::from(rate_scalar))
        .ok_or(MarketError::ArithmeticError("rate anchor division"))?;

    last_exchange_rate
        .checked_sub(new_exchange_rate)
        .ok_or(MarketError::ArithmeticError("rate anchor"))
}

/// Calculates the exchange rate based on the proportion of the trade,
/// rate scalar, and rate anchor.
///
/// The exchange rate represents how many PT one asset buys. It must be
/// greater than 1: PT redeems 1:1 at maturity, so a rate at or below 1
/// would let anyone buy PT at no discount and redeem at par for a
/// risk-free profit. The margin above 1 is the time value of the
/// principal, and it narrows towards 1 as maturity approaches.
pub fn calc_exchange_rate(
    proportion: Decimal,
    rate_anchor: PreciseDecimal,
    rate_scalar: Decimal,
) -> Result<PreciseDecimal, MarketError> {
    let ln_proportion = log_proportion(proportion)?;

    let exchange_rate = ln_proportion
        .checked_div(PreciseDecimal::from(rate_scalar))
        .and_then(|result| result.checked_add(rate_anchor))
        .ok_or(MarketError::ArithmeticError("exchange rate"))?;

    if exchange_rate <= PreciseDecimal::ONE {
        return Err(MarketError::NonInvertibleRate(exchange_rate));
    }

    Ok(exchange_rate)
}

/// Calculates the fee based on the direction of the trade.
/// Since fees are a function of time to maturity, the fees will decrease
/// as the market matures and contribute to flattening the curve over
/// time.
///
/// The returned fee is always positive. For a PT buy the (negative)
/// pre-fee amount is multiplied by the (negative) `1 - fee_rate` term;
/// for a PT sell the term is divided back out and negated.
pub fn calc_fee(
    fee_rate: PreciseDecimal,
    time_to_expiry: i64,
    net_pt_amount: Decimal,
    exchange_rate: PreciseDecimal,
    pre_fee_amount: PreciseDecimal,
) -> Result<PreciseDecimal, MarketError> {
    // In this case, the fee rate is the implied rate.
    let fee_exchange_rate =
        calc_exchange_rate_from_implied_rate(fee_rate, time_to_expiry)?;

    if net_pt_amount > Decimal::ZERO {
        let post_fee_exchange_rate = exchange_rate
            .checked_div(fee_exchange_rate)
            .ok_or(MarketError::ArithmeticError("post-fee exchange rate"))?;

        if post_fee_exchange_rate <= PreciseDecimal::ONE {
            return Err(MarketError::NonInvertibleRate(post_fee_exchange_rate));
        }

        pre_fee_amount
            .checked_mul(
                PreciseDecimal::ONE
                    .checked_sub(fee_exchange_rate)
                    .ok_or(MarketError::ArithmeticError("fee factor"))?,
            )
            .ok_or(MarketError::ArithmeticError("fee amount"))
    } else {
        pre_fee_amount
            .checked_mul(
                PreciseDecimal::ONE
                    .checked_sub(fee_exchange_rate)
                    .ok_or(MarketError::ArithmeticError("fee factor"))?,
            )
            .and_then(|result| result.checked_div(fee_exchange_rate))
            .and_then(|result| result.checked_neg())
            .ok_or(MarketError::ArithmeticError("fee amount"))
    }
}

/// Converts an implied rate to an exchange rate given a time to expiry,
/// `e^(rate * t / PERIOD_SIZE)`.
pub fn calc_exchange_rate_from_implied_rate(
    ln_implied_rate: PreciseDecimal,
    time_to_expiry: i64,
) -> Result<PreciseDecimal, MarketError> {
    let rt = ln_implied_rate
        .checked_mul(PreciseDecimal::from(time_to_expiry))
        .and_then(|result| result.checked_div(PreciseDecimal::from(PERIOD_SIZE)))
        .ok_or(MarketError::ArithmeticError("implied rate exponent"))?;

    rt.exp()
        .ok_or(MarketError::ArithmeticError("implied rate exp"))
}

/// Annualizes the exchange rate at the given proportion back into a ln
/// implied rate, the inverse of [`calc_exchange_rate_from_implied_rate`].
pub fn calc_ln_implied_rate(
    proportion: Decimal,
    rate_anchor: PreciseDecimal,
    rate_scalar: Decimal,
    time_to_expiry: i64,
) -> Result<PreciseDecimal, MarketError> {
    let exchange_rate = calc_exchange_rate(proportion, rate_anchor, rate_scalar)?;

    // exchange_rate > 1 so its ln > 0
    let ln_exchange_rate = exchange_rate
        .ln()
        .ok_or(MarketError::ArithmeticError("implied rate log"))?;

    ln_exchange_rate
        .checked_mul(PreciseDecimal::from(PERIOD_SIZE))
        .and_then(|result| result.checked_div(PreciseDecimal::from(time_to_expiry.max(1))))
        .ok_or(MarketError::ArithmeticError("implied rate"))
}
