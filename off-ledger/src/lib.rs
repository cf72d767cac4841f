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

//! Off-ledger quoting engine for the yield AMM.
//!
//! Given a [`MarketState`] snapshot, the market fees and a signed PT
//! trade size, computes the counterparty asset amount, the effective
//! exchange rate and the fee split, using the same logit curve and the
//! same fixed-point `ln`/`exp` (`scrypto_math`) as the on-ledger
//! component, so quotes agree with settlement bit-for-bit.
//!
//! Every call is a pure function over immutable borrows: no state is
//! held between quotes, and a new snapshot must be fetched by the
//! caller whenever freshness matters.
//!
//! [`MarketState`]: common::structs::MarketState

pub mod error;
pub mod liquidity_curve;
pub mod market;
pub mod market_approx;
pub mod time;

pub use error::MarketError;
