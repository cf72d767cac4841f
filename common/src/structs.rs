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

/// Snapshot of the market's reserves and curve state, decoded from the
/// AMM component state by the caller. Immutable for the duration of one
/// quote; fetch a fresh snapshot before the next quote if freshness
/// matters.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct MarketState {
    pub total_pt: Decimal,
    pub total_asset: Decimal,
    /// The initial immutable scalar root of the market which determines
    /// the steepness of the curve.
    pub scalar_root: Decimal,
    /// The natural log of the implied rate of the last trade.
    pub last_ln_implied_rate: PreciseDecimal,
}

#[derive(ScryptoSbor, Clone, Debug)]
pub struct MarketFee {
    // The trading fee charged on each trade.
    pub fee_rate: PreciseDecimal,
    // The reserve fee rate.
    pub reserve_fee_percent: Decimal,
}

/// Retrieves before-trade calculations for the
/// exchange rate.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct MarketCompute {
    pub rate_scalar: Decimal,
    pub rate_anchor: PreciseDecimal,
}

/// The priced trade. `net_amount` is the asset leg of the swap: for a
/// PT buy (positive PT delta) it is the asset amount the trader pays
/// into the pool, for a PT sell it is the asset amount the pool pays
/// out. Consumed by the display layer and the manifest builder;
/// never persisted.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct TradeQuote {
    pub net_amount: Decimal,
    pub pre_fee_exchange_rate: PreciseDecimal,
    pub total_fees: PreciseDecimal,
    pub reserve_fees: PreciseDecimal,
    pub trading_fees: PreciseDecimal,
}

/// Explicit rounding configuration for amount-valued results. Curve
/// parameters are never rounded; amounts are rounded wherever the
/// settlement path rounds them.
///
/// The default matches the reference quoting behaviour (18 decimal
/// places, truncating). A caller that mirrors on-ledger settlement
/// passes the resource divisibility and `RoundingMode::AwayFromZero`.
#[derive(Clone, Copy, Debug)]
pub struct NumericContext {
    pub decimal_places: u8,
    pub rounding_mode: RoundingMode,
}

impl NumericContext {
    pub const fn new(decimal_places: u8, rounding_mode: RoundingMode) -> Self {
        Self {
            decimal_places,
            rounding_mode,
        }
    }
}

impl Default for NumericContext {
    fn default() -> Self {
        Self::new(18, RoundingMode::ToZero)
    }
}
