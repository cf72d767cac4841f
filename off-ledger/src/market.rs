// Copyright 2025 PrismTerminal
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use scrypto::prelude::*;
use tracing::debug;

use common::structs::*;

use crate::error::MarketError;
use crate::liquidity_curve::*;

/// Derives the curve parameters for the current snapshot and time to
/// expiry. The parameters are ephemeral: they must be recomputed for
/// every quote and never reused across different time values.
pub fn compute_market(
    market_state: &MarketState,
    time_to_expiry: i64,
) -> Result<MarketCompute, MarketError> {
    let proportion = calc_proportion(
        dec!(0),
        market_state.total_pt,
        market_state.total_asset,
    )?;

    let rate_scalar = calc_rate_scalar(market_state.scalar_root, time_to_expiry)?;

    let rate_anchor = calc_rate_anchor(
        market_state.last_ln_implied_rate,
        proportion,
        time_to_expiry,
        rate_scalar,
    )?;

    debug!(
        "[compute_market] Pre-trade Proportion: {:?} Rate Scalar: {:?} Rate Anchor: {:?}",
        proportion, rate_scalar, rate_anchor
    );

    Ok(MarketCompute {
        rate_scalar,
        rate_anchor,
    })
}

/// Prices the trade based on its direction and size.
///
/// `net_pt_amount > 0` means PT leaves the pool (the trader buys PT and
/// pays asset in); `net_pt_amount < 0` means PT enters the pool (the
/// trader sells PT and receives asset). The quote's `net_amount` is the
/// asset leg in both cases, adjusted for the reserve fee the pool
/// retains on settlement.
///
/// Pure over its inputs; nothing here mutates the snapshot, and the
/// same inputs always produce the same quote.
pub fn calc_trade(
    net_pt_amount: Decimal,
    time_to_expiry: i64,
    market_state: &MarketState,
    market_compute: &MarketCompute,
    market_fee: &MarketFee,
    ctx: &NumericContext,
) -> Result<TradeQuote, MarketError> {
    let proportion = calc_proportion(
        net_pt_amount,
        market_state.total_pt,
        market_state.total_asset,
    )?;

    debug!("[calc_trade] Trade Proportion: {:?}", proportion);

    // Exchange rate based on the size of the trade (change)
    let pre_fee_exchange_rate = calc_exchange_rate(
        proportion,
        market_compute.rate_anchor,
        market_compute.rate_scalar,
    )?;

    debug!(
        "[calc_trade] Exchange Rate Before Fees: {:?}",
        pre_fee_exchange_rate
    );

    // Amount returned by applying the exchange rate against the PT
    // swapped, before fees are applied. Opposite sign to the PT leg.
    let pre_fee_amount = PreciseDecimal::from(net_pt_amount)
        .checked_div(pre_fee_exchange_rate)
        .and_then(|amount| amount.checked_neg())
        .and_then(|amount| amount.checked_round(ctx.decimal_places, ctx.rounding_mode))
        .ok_or(MarketError::ArithmeticError("pre-fee amount"))?;

    debug!(
        "[calc_trade] Amount to Return Before Fees: {:?}",
        pre_fee_amount
    );

    let total_fees = calc_fee(
        market_fee.fee_rate,
        time_to_expiry,
        net_pt_amount,
        pre_fee_exchange_rate,
        pre_fee_amount,
    )?;

    debug!("[calc_trade] Base Fee: {:?}", total_fees);

    let (reserve_fees, trading_fees) =
        split_fee(total_fees, market_fee.reserve_fee_percent, ctx)?;

    debug!(
        "[calc_trade] Reserve Fee: {:?} Trading Fee: {:?}",
        reserve_fees, trading_fees
    );

    // If this is a PT sell then pre_fee_amount is positive and the
    // trading fee reduces what the pool pays out; on a PT buy
    // pre_fee_amount is negative and the fee adds to what the trader
    // pays in.
    let net_amount = pre_fee_amount
        .checked_sub(trading_fees)
        .and_then(|amount| amount.checked_round(ctx.decimal_places, ctx.rounding_mode))
        .ok_or(MarketError::ArithmeticError("net amount"))?;

    // Net amount can be negative depending on the direction of the
    // trade, but the settlement instruction needs a positive asset
    // amount. The reserve fee is added back on the buy side and
    // subtracted on the sell side, mirroring how settlement books the
    // reserve's cut.
    let net_amount = if net_amount < PreciseDecimal::ZERO {
        // Asset ---> PT
        debug!("[calc_trade] Trade Direction: Asset ---> PT");
        net_amount
            .checked_add(reserve_fees)
            .and_then(|amount| amount.checked_abs())
            .and_then(|amount| amount.checked_round(ctx.decimal_places, ctx.rounding_mode))
            .ok_or(MarketError::ArithmeticError("net amount rebalance"))?
    } else {
        // PT ---> Asset
        debug!("[calc_trade] Trade Direction: PT ---> Asset");
        net_amount
            .checked_sub(reserve_fees)
            .and_then(|amount| amount.checked_round(ctx.decimal_places, ctx.rounding_mode))
            .ok_or(MarketError::ArithmeticError("net amount rebalance"))?
    };

    let net_amount = Decimal::try_from(net_amount)
        .map_err(|_| MarketError::ArithmeticError("net amount narrowing"))?;

    debug!("[calc_trade] Amount to Return After Fees: {:?}", net_amount);

    Ok(TradeQuote {
        net_amount,
        pre_fee_exchange_rate,
        total_fees,
        reserve_fees,
        trading_fees,
    })
}

/// Partitions the collected fee into the protocol reserve's share and
/// the liquidity providers' share.
///
/// The reserve share is rounded at the context; the trading share is
/// the exact remainder, so `reserve_fees + trading_fees == total_fees`
/// always holds.
pub fn split_fee(
    total_fees: PreciseDecimal,
    reserve_fee_percent: Decimal,
    ctx: &NumericContext,
) -> Result<(PreciseDecimal, PreciseDecimal), MarketError> {
    let reserve_fees = total_fees
        .checked_mul(PreciseDecimal::from(reserve_fee_percent))
        .and_then(|amount| amount.checked_round(ctx.decimal_places, ctx.rounding_mode))
        .ok_or(MarketError::ArithmeticError("reserve fee"))?;

    let trading_fees = total_fees
        .checked_sub(reserve_fees)
        .ok_or(MarketError::ArithmeticError("trading fee"))?;

    Ok((reserve_fees, trading_fees))
}

/// Current market implied rate: the annualized ln rate encoded by the
/// curve at the pool's resting proportion. Displayed as the implied APY
/// and recorded as `last_ln_implied_rate` after a trade settles.
pub fn market_implied_rate(
    market_state: &MarketState,
    market_compute: &MarketCompute,
    time_to_expiry: i64,
) -> Result<PreciseDecimal, MarketError> {
    let proportion = calc_proportion(
        dec!(0),
        market_state.total_pt,
        market_state.total_asset,
    )?;

    calc_ln_implied_rate(
        proportion,
        market_compute.rate_anchor,
        market_compute.rate_scalar,
        time_to_expiry,
    )
}
