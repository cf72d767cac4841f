use scrypto::prelude::*;

use common::structs::*;
use off_ledger::market::*;
use off_ledger::MarketError;

fn assert_close(actual: PreciseDecimal, expected: PreciseDecimal) {
    let tolerance = pdec!("0.000000001");
    let delta = actual.checked_sub(expected).unwrap().checked_abs().unwrap();
    assert!(
        delta < tolerance,
        "expected {:?} within {:?} of {:?}",
        actual,
        tolerance,
        expected
    );
}

fn assert_close_dec(actual: Decimal, expected: Decimal) {
    assert_close(PreciseDecimal::from(actual), PreciseDecimal::from(expected));
}

/// The reference scenario: a fresh balanced 100/100 pool with a very
/// steep curve, quoted one full period before maturity.
fn steep_market() -> (MarketState, MarketFee, i64) {
    let market_state = MarketState {
        total_pt: dec!(100),
        total_asset: dec!(100),
        scalar_root: dec!(0.1),
        last_ln_implied_rate: pdec!("0.1"),
    };
    let market_fee = MarketFee {
        fee_rate: pdec!("0.01"),
        reserve_fee_percent: dec!(0.5),
    };
    (market_state, market_fee, 31_536_000)
}

/// A deeper pool with a realistic scalar, quoted half a period out.
fn deep_market() -> (MarketState, MarketFee, i64) {
    let market_state = MarketState {
        total_pt: dec!(1000),
        total_asset: dec!(1000),
        scalar_root: dec!(50),
        last_ln_implied_rate: pdec!("0.05"),
    };
    let market_fee = MarketFee {
        fee_rate: pdec!("0.01"),
        reserve_fee_percent: dec!(0.5),
    };
    (market_state, market_fee, 15_768_000)
}

#[test]
fn steep_market_curve_parameters() {
    let (market_state, _, time_to_expiry) = steep_market();

    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();

    // One full period to expiry leaves the scalar root untouched.
    assert_eq!(market_compute.rate_scalar, dec!(0.1));
    // Balanced pool: the anchor is exactly e^0.1.
    assert_close(market_compute.rate_anchor, pdec!("1.105170918075647624"));
}

#[test]
fn steep_market_rejects_a_one_pt_buy() {
    // With a rate scalar of 0.1 even a 1 PT buy pushes the implied
    // exchange rate below parity; the trade is economically invalid and
    // must be refused, not priced.
    let (market_state, market_fee, time_to_expiry) = steep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();

    let result = calc_trade(
        dec!(1),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &NumericContext::default(),
    );

    assert!(matches!(result, Err(MarketError::NonInvertibleRate(_))));
}

#[test]
fn steep_market_one_pt_sell_reference_values() {
    let (market_state, market_fee, time_to_expiry) = steep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();

    let quote = calc_trade(
        dec!(-1),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &NumericContext::default(),
    )
    .unwrap();

    assert_close(quote.pre_fee_exchange_rate, pdec!("1.305177585142342865"));
    assert_close(quote.total_fees, pdec!("0.007623611042743106"));
    assert_close(quote.reserve_fees, pdec!("0.003811805521371553"));
    assert_close(quote.trading_fees, pdec!("0.003811805521371553"));
    assert_close_dec(quote.net_amount, dec!("0.758555651751553079"));
}

#[test]
fn deep_market_buy_and_sell_reference_values() {
    let (market_state, market_fee, time_to_expiry) = deep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let ctx = NumericContext::default();

    assert_eq!(market_compute.rate_scalar, dec!(100));
    assert_close(market_compute.rate_anchor, pdec!("1.025315120524428840"));

    let buy = calc_trade(
        dec!(100),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &ctx,
    )
    .unwrap();

    assert_close(buy.pre_fee_exchange_rate, pdec!("1.023308413569807329"));
    assert_close(buy.total_fees, pdec!("0.489834813525563061"));
    assert_close(buy.reserve_fees, pdec!("0.244917406762781530"));
    assert_close_dec(buy.net_amount, dec!("97.722249396103759074"));

    let sell = calc_trade(
        dec!(-100),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &ctx,
    )
    .unwrap();

    assert_close(sell.pre_fee_exchange_rate, pdec!("1.027321827479050352"));
    assert_close(sell.total_fees, pdec!("0.485487670359013627"));
    assert_close_dec(sell.net_amount, dec!("96.854992523068248841"));

    // The fee sandwich: buying 100 PT costs more asset than selling
    // 100 PT returns.
    assert!(buy.net_amount > sell.net_amount);
}

#[test]
fn quotes_are_deterministic() {
    let (market_state, market_fee, time_to_expiry) = deep_market();
    let ctx = NumericContext::default();

    let first_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let second_compute = compute_market(&market_state, time_to_expiry).unwrap();
    assert_eq!(first_compute.rate_scalar, second_compute.rate_scalar);
    assert_eq!(first_compute.rate_anchor, second_compute.rate_anchor);

    let first = calc_trade(
        dec!(-25),
        time_to_expiry,
        &market_state,
        &first_compute,
        &market_fee,
        &ctx,
    )
    .unwrap();
    let second = calc_trade(
        dec!(-25),
        time_to_expiry,
        &market_state,
        &second_compute,
        &market_fee,
        &ctx,
    )
    .unwrap();

    assert_eq!(first.net_amount, second.net_amount);
    assert_eq!(first.pre_fee_exchange_rate, second.pre_fee_exchange_rate);
    assert_eq!(first.total_fees, second.total_fees);
    assert_eq!(first.reserve_fees, second.reserve_fees);
    assert_eq!(first.trading_fees, second.trading_fees);
}

#[test]
fn zero_fee_rate_collects_nothing() {
    let (market_state, _, time_to_expiry) = deep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let market_fee = MarketFee {
        fee_rate: PreciseDecimal::ZERO,
        reserve_fee_percent: dec!(0.5),
    };
    let ctx = NumericContext::default();

    for net_pt_amount in [dec!(100), dec!(-100)] {
        let quote = calc_trade(
            net_pt_amount,
            time_to_expiry,
            &market_state,
            &market_compute,
            &market_fee,
            &ctx,
        )
        .unwrap();

        assert_eq!(quote.total_fees, PreciseDecimal::ZERO);
        assert_eq!(quote.reserve_fees, PreciseDecimal::ZERO);
        assert_eq!(quote.trading_fees, PreciseDecimal::ZERO);
    }

    // With no fee the sell side pays out the pre-fee amount untouched.
    let sell = calc_trade(
        dec!(-100),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &ctx,
    )
    .unwrap();
    assert_close_dec(sell.net_amount, dec!("97.340480193427262468"));
}

#[test]
fn zero_reserve_share_leaves_everything_to_liquidity_providers() {
    let (market_state, _, time_to_expiry) = deep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let market_fee = MarketFee {
        fee_rate: pdec!("0.01"),
        reserve_fee_percent: Decimal::ZERO,
    };

    let quote = calc_trade(
        dec!(-100),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &NumericContext::default(),
    )
    .unwrap();

    assert_eq!(quote.reserve_fees, PreciseDecimal::ZERO);
    assert_eq!(quote.trading_fees, quote.total_fees);
}

#[test]
fn trades_exceeding_liquidity_are_rejected() {
    let (market_state, market_fee, time_to_expiry) = steep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let ctx = NumericContext::default();

    // Draining the PT reserve exactly (proportion 0), overdraining it
    // (proportion < 0), and overfilling it (proportion >= 1).
    for net_pt_amount in [dec!(100), dec!(150), dec!(-100), dec!(-150)] {
        let result = calc_trade(
            net_pt_amount,
            time_to_expiry,
            &market_state,
            &market_compute,
            &market_fee,
            &ctx,
        );
        assert!(
            matches!(result, Err(MarketError::DegenerateProportion(_))),
            "net_pt_amount {:?} produced {:?}",
            net_pt_amount,
            result
        );
    }
}

#[test]
fn implied_rate_matches_the_anchor_derivation() {
    let (market_state, _, time_to_expiry) = deep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();

    let ln_implied_rate =
        market_implied_rate(&market_state, &market_compute, time_to_expiry).unwrap();

    // The balanced pool still encodes the rate of the last trade.
    assert_close(ln_implied_rate, pdec!("0.05"));
}

#[test]
fn settlement_rebalance_keeps_the_buy_side_positive() {
    // On a buy the raw net amount is negative (asset flowing into the
    // pool); the reserve fee is added back before taking the absolute
    // value. With an asymmetric split the buyer's total is the pre-fee
    // amount plus the liquidity providers' share net of the reserve's.
    let (market_state, _, time_to_expiry) = deep_market();
    let market_compute = compute_market(&market_state, time_to_expiry).unwrap();
    let market_fee = MarketFee {
        fee_rate: pdec!("0.01"),
        reserve_fee_percent: dec!(0.25),
    };

    let quote = calc_trade(
        dec!(100),
        time_to_expiry,
        &market_state,
        &market_compute,
        &market_fee,
        &NumericContext::default(),
    )
    .unwrap();

    assert!(quote.net_amount > Decimal::ZERO);
    assert_close_dec(quote.net_amount, dec!("97.967166802866540604"));
}

mod fee_split {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_always_sums_back_to_the_total(
            raw_fee in -1_000_000_000_000i64..1_000_000_000_000i64,
            percent in 0u8..=100u8,
        ) {
            let total_fees = PreciseDecimal::from(raw_fee)
                .checked_div(pdec!(1000000))
                .unwrap();
            let reserve_fee_percent =
                Decimal::from(percent).checked_div(dec!(100)).unwrap();

            for ctx in [
                NumericContext::default(),
                NumericContext::new(6, RoundingMode::AwayFromZero),
            ] {
                let (reserve_fees, trading_fees) =
                    split_fee(total_fees, reserve_fee_percent, &ctx).unwrap();

                prop_assert_eq!(
                    reserve_fees.checked_add(trading_fees).unwrap(),
                    total_fees
                );
            }
        }

        #[test]
        fn full_reserve_share_takes_the_whole_fee(
            raw_fee in 0i64..1_000_000_000i64,
        ) {
            let total_fees = PreciseDecimal::from(raw_fee)
                .checked_div(pdec!(1000))
                .unwrap();

            let (reserve_fees, trading_fees) =
                split_fee(total_fees, dec!(1), &NumericContext::default()).unwrap();

            prop_assert_eq!(reserve_fees, total_fees);
            prop_assert_eq!(trading_fees, PreciseDecimal::ZERO);
        }
    }
}
