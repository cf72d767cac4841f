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

//! Trade-size approximation.
//!
//! The curve prices a PT-denominated trade, but a trader usually enters
//! the asset amount they want to spend. The asset leg is a strictly
//! increasing function of the PT size, so a bisection over the PT delta
//! recovers the trade whose quoted asset leg matches the requested
//! amount.

use scrypto::prelude::*;
use tracing::debug;

use common::structs::*;

use crate::error::MarketError;
use crate::liquidity_curve::calc_proportion;
use crate::market::calc_trade;

/// Largest share of the pool the PT reserve may reach through a single
/// trade. Beyond this the curve is too steep to price sells sanely.
pub const MAX_MARKET_PROPORTION: Decimal = dec!(0.96);

/// Search bounds and stopping rule for the bisection. `eps` is relative
/// to the requested asset amount; `guess_offchain` is an optional seed
/// (e.g. a previous quote) tried before bisecting.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct ApproxParams {
    pub guess_min: Decimal,
    pub guess_max: Decimal,
    pub guess_offchain: Decimal,
    pub max_iteration: u32,
    pub eps: Decimal,
}

impl Default for ApproxParams {
    fn default() -> Self {
        Self {
            guess_min: Decimal::ZERO,
            guess_max: Decimal::ZERO,
            guess_offchain: Decimal::ZERO,
            max_iteration: 256,
            eps: dec!(0.0001),
        }
    }
}

/// Finds the PT amount bought by spending exactly `exact_asset_in`
/// (within `eps` relative tolerance, never overspending).
///
/// A guess whose quote fails with [`MarketError::NonInvertibleRate`] or
/// [`MarketError::DegenerateProportion`] is simply too large for the
/// curve and tightens the upper bound; any other failure propagates.
pub fn approx_swap_exact_asset_for_pt(
    market_state: &MarketState,
    market_compute: &MarketCompute,
    market_fee: &MarketFee,
    time_to_expiry: i64,
    exact_asset_in: Decimal,
    approx: &ApproxParams,
    ctx: &NumericContext,
) -> Result<Decimal, MarketError> {
    if exact_asset_in <= Decimal::ZERO {
        return Err(MarketError::ArithmeticError(
            "exact asset in must be positive",
        ));
    }

    let mut guess_min = approx.guess_min.max(Decimal::ZERO);
    let mut guess_max = approx.guess_max.min(market_state.total_pt);

    if guess_max <= guess_min {
        return Err(MarketError::ArithmeticError(
            "approximation bounds are empty",
        ));
    }

    let asset_in_for = |net_pt_amount: Decimal| -> Result<Option<Decimal>, MarketError> {
        match calc_trade(
            net_pt_amount,
            time_to_expiry,
            market_state,
            market_compute,
            market_fee,
            ctx,
        ) {
            // net_amount is the asset the trader pays in for this buy
            Ok(quote) => Ok(Some(quote.net_amount)),
            Err(MarketError::NonInvertibleRate(_))
            | Err(MarketError::DegenerateProportion(_)) => Ok(None),
            Err(other) => Err(other),
        }
    };

    let tolerance = exact_asset_in
        .checked_mul(approx.eps)
        .ok_or(MarketError::ArithmeticError("approximation tolerance"))?;

    let within_tolerance = |asset_in: Decimal| -> bool {
        asset_in <= exact_asset_in && exact_asset_in - asset_in <= tolerance
    };

    if approx.guess_offchain > guess_min && approx.guess_offchain < guess_max {
        if let Some(asset_in) = asset_in_for(approx.guess_offchain)? {
            if within_tolerance(asset_in) {
                return Ok(approx.guess_offchain);
            }
        }
    }

    for iteration in 0..approx.max_iteration {
        let guess = guess_min
            .checked_add(guess_max)
            .and_then(|sum| sum.checked_div(dec!(2)))
            .ok_or(MarketError::ArithmeticError("bisection midpoint"))?;

        match asset_in_for(guess)? {
            Some(asset_in) if within_tolerance(asset_in) => {
                debug!(
                    "[approx_swap_exact_asset_for_pt] Converged after {:?} iterations: {:?}",
                    iteration, guess
                );
                return Ok(guess);
            }
            Some(asset_in) if asset_in > exact_asset_in => guess_max = guess,
            Some(_) => guess_min = guess,
            // Curve rejected the guess outright: too much PT out.
            None => guess_max = guess,
        }
    }

    Err(MarketError::ApproxExhausted(approx.max_iteration))
}

/// Largest PT amount the pool accepts on a sell before the post-trade
/// proportion breaches [`MAX_MARKET_PROPORTION`]. Used as the sell-side
/// upper search bound.
pub fn calc_max_pt_in(
    market_state: &MarketState,
    _market_compute: &MarketCompute,
) -> Result<Decimal, MarketError> {
    let proportion = calc_proportion(
        dec!(0),
        market_state.total_pt,
        market_state.total_asset,
    )?;

    if proportion >= MAX_MARKET_PROPORTION {
        return Err(MarketError::MaxMarketProportionReached(proportion));
    }

    let denominator = market_state
        .total_pt
        .checked_add(market_state.total_asset)
        .ok_or(MarketError::ArithmeticError("pool size"))?;

    MAX_MARKET_PROPORTION
        .checked_mul(denominator)
        .and_then(|max_total_pt| max_total_pt.checked_sub(market_state.total_pt))
        .ok_or(MarketError::ArithmeticError("max pt in"))
}
