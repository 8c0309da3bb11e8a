use proptest::{prop_assert, prop_assert_eq, proptest};

use super::*;
use crate::libraries::constants::DEFAULT_TICK_SPACING;

fn price(text: &str) -> Price {
    text.parse().unwrap()
}

mod spread_range {
    use super::*;

    #[test]
    fn should_match_reference_example() {
        // 1 LINK = 10 USDC, +/-20%, 0.3% tier
        let (raw_lower, raw_upper) = raw_ticks_from_price(10.0, 0.2).unwrap();
        assert_eq!(raw_lower, 20795);
        assert_eq!(raw_upper, 24851);

        let range = get_tick_range_from_price(10.0, DEFAULT_SPREAD, DEFAULT_TICK_SPACING).unwrap();
        assert_eq!(
            range,
            TickRange {
                tick_lower: 20820,
                tick_upper: 24840
            }
        );
    }

    #[test]
    fn should_apply_request_defaults() {
        let request = TickRangeRequest::new(10.0);
        assert_eq!(request.spread, 0.2);
        assert_eq!(request.tick_spacing, 60);
        assert_eq!(
            request.resolve(),
            get_tick_range_from_price(10.0, 0.2, 60)
        );
        assert_eq!(
            request.with_snap(SnapMode::Outward).resolve().unwrap().tick_upper,
            24900
        );
        assert_eq!(
            request.with_spread(2.0).resolve(),
            Err(TickRangeError::InvalidSpread(2.0))
        );
        assert_eq!(
            request.with_tick_spacing(10).resolve().unwrap().tick_lower % 10,
            0
        );
    }

    #[test]
    fn should_cover_requested_range_when_snapping_outward() {
        let range = get_tick_range_from_price_with(10.0, 0.2, 60, SnapMode::Outward).unwrap();
        assert_eq!(
            range,
            TickRange {
                tick_lower: 20760,
                tick_upper: 24900
            }
        );
    }

    #[test]
    fn should_round_halves_up() {
        assert_eq!(nearest_usable_tick(30, 60), Ok(60));
        assert_eq!(nearest_usable_tick(29, 60), Ok(0));
        assert_eq!(nearest_usable_tick(-30, 60), Ok(0));
        assert_eq!(nearest_usable_tick(-31, 60), Ok(-60));
        assert_eq!(nearest_usable_tick(90, 60), Ok(120));
        assert_eq!(nearest_usable_tick(-887272, 60), Ok(-887280));
    }

    #[test]
    fn should_reject_non_positive_spacing_when_snapping() {
        assert_eq!(
            nearest_usable_tick(30, 0),
            Err(TickRangeError::InvalidTickSpacing(0))
        );
        assert_eq!(
            nearest_usable_tick(30, -60),
            Err(TickRangeError::InvalidTickSpacing(-60))
        );
    }

    #[test]
    fn should_reject_malformed_input() {
        assert_eq!(
            get_tick_range_from_price(0.0, 0.2, 60),
            Err(TickRangeError::InvalidPrice(0.0))
        );
        assert_eq!(
            get_tick_range_from_price(-3.0, 0.2, 60),
            Err(TickRangeError::InvalidPrice(-3.0))
        );
        assert!(matches!(
            get_tick_range_from_price(f64::NAN, 0.2, 60),
            Err(TickRangeError::InvalidPrice(_))
        ));
        assert!(matches!(
            get_tick_range_from_price(f64::INFINITY, 0.2, 60),
            Err(TickRangeError::InvalidPrice(_))
        ));
        for spread in [0.0, 1.0, 1.5, -0.1] {
            assert_eq!(
                get_tick_range_from_price(10.0, spread, 60),
                Err(TickRangeError::InvalidSpread(spread))
            );
        }
        assert_eq!(
            get_tick_range_from_price(10.0, 0.2, 0),
            Err(TickRangeError::InvalidTickSpacing(0))
        );
        assert_eq!(
            get_tick_range_from_price(10.0, 0.2, -60),
            Err(TickRangeError::InvalidTickSpacing(-60))
        );
    }

    #[test]
    fn should_reject_prices_off_the_tick_grid() {
        assert!(matches!(
            get_tick_range_from_price(1e300, 0.2, 60),
            Err(TickRangeError::TickOutOfBounds(_))
        ));
    }

    proptest! {
        #[test]
        fn raw_ticks_bracket_the_center_tick(
            price in 1e-6f64..1e6f64,
            spread in 0.001f64..0.99f64,
        ) {
            let (raw_lower, raw_upper) = raw_ticks_from_price(price, spread).unwrap();
            let center = log_base_1_0001(price);
            prop_assert!(raw_lower as f64 <= center);
            prop_assert!(center <= raw_upper as f64);
        }

        #[test]
        fn nearest_snap_moves_at_most_half_a_spacing(
            price in 1e-6f64..1e6f64,
            spread in 0.001f64..0.99f64,
            tick_spacing in 1i32..=200i32,
        ) {
            let (raw_lower, raw_upper) = raw_ticks_from_price(price, spread).unwrap();
            let range = get_tick_range_from_price(price, spread, tick_spacing).unwrap();

            prop_assert_eq!(range.tick_lower % tick_spacing, 0);
            prop_assert_eq!(range.tick_upper % tick_spacing, 0);
            prop_assert!(range.tick_lower <= range.tick_upper);
            prop_assert!((range.tick_lower - raw_lower).abs() * 2 <= tick_spacing);
            prop_assert!((range.tick_upper - raw_upper).abs() * 2 <= tick_spacing);
        }

        #[test]
        fn outward_snap_never_uncovers(
            price in 1e-6f64..1e6f64,
            spread in 0.001f64..0.99f64,
            tick_spacing in 1i32..=200i32,
        ) {
            let (raw_lower, raw_upper) = raw_ticks_from_price(price, spread).unwrap();
            let range =
                get_tick_range_from_price_with(price, spread, tick_spacing, SnapMode::Outward).unwrap();

            prop_assert!(range.tick_lower <= raw_lower);
            prop_assert!(range.tick_upper >= raw_upper);
            prop_assert!(raw_lower - range.tick_lower < tick_spacing);
            prop_assert!(range.tick_upper - raw_upper < tick_spacing);
        }
    }
}

mod explicit_bounds {
    use super::*;

    #[test]
    fn should_map_fee_tiers_to_tick_spacing() {
        assert_eq!(PoolFee(100).tick_spacing(), Ok(PoolTickSpacing(1)));
        assert_eq!(PoolFee(500).tick_spacing(), Ok(PoolTickSpacing(10)));
        assert_eq!(PoolFee(3000).tick_spacing(), Ok(PoolTickSpacing(60)));
        assert_eq!(PoolFee(10000).tick_spacing(), Ok(PoolTickSpacing(200)));
    }

    #[test]
    fn should_fail_on_unsupported_fee_tier() {
        let result = get_tick_range(&price("1"), &price("2"), PoolFee(7));
        assert_eq!(result, Err(TickRangeError::UnsupportedFeeTier(7)));
        assert_eq!(
            result.unwrap_err().to_string(),
            "unsupported fee tier: 7"
        );
    }

    #[test]
    fn should_align_bounds_outward() {
        let range = get_tick_range(&price("0.5"), &price("2"), PoolFee::MEDIUM).unwrap();
        assert_eq!(
            range,
            TickRange {
                tick_lower: -6960,
                tick_upper: 6960
            }
        );

        let range = get_tick_range(&price("1"), &price("10"), PoolFee::LOW).unwrap();
        assert_eq!(
            range,
            TickRange {
                tick_lower: 0,
                tick_upper: 23030
            }
        );
    }

    #[test]
    fn should_reject_inverted_or_empty_bounds() {
        assert!(matches!(
            get_tick_range(&price("2"), &price("1"), PoolFee::MEDIUM),
            Err(TickRangeError::InvalidPriceBounds { .. })
        ));
        assert!(matches!(
            get_tick_range(&price("2"), &price("2.00"), PoolFee::MEDIUM),
            Err(TickRangeError::InvalidPriceBounds { .. })
        ));
    }

    #[test]
    fn should_compute_full_range() {
        assert_eq!(
            full_range(PoolTickSpacing(60)).unwrap(),
            TickRange {
                tick_lower: -887220,
                tick_upper: 887220
            }
        );
        assert_eq!(
            full_range(PoolTickSpacing(10)).unwrap(),
            TickRange {
                tick_lower: -887270,
                tick_upper: 887270
            }
        );
        assert!(full_range(PoolTickSpacing(0)).is_err());
    }

    proptest! {
        #[test]
        fn medium_tier_ticks_are_aligned_and_ordered(
            lower in 1e-4f64..1e4f64,
            factor in 1.0001f64..100f64,
        ) {
            let price_lower = Price::try_from(lower).unwrap();
            let price_upper = Price::try_from(lower * factor).unwrap();
            let range = get_tick_range(&price_lower, &price_upper, PoolFee::MEDIUM).unwrap();

            prop_assert_eq!(range.tick_lower % 60, 0);
            prop_assert_eq!(range.tick_upper % 60, 0);
            prop_assert!(range.tick_lower <= range.tick_upper);
            prop_assert!((range.tick_lower as f64) <= log_base_1_0001(lower));
        }
    }
}

mod range_spec {
    use super::*;

    #[test]
    fn should_resolve_plan_ranges() {
        let full: RangeSpec = serde_json::from_str(r#"{"kind":"full"}"#).unwrap();
        assert_eq!(
            full.resolve(PoolTickSpacing(60)).unwrap(),
            TickRange {
                tick_lower: -887220,
                tick_upper: 887220
            }
        );

        let spread: RangeSpec = serde_json::from_str(r#"{"kind":"spread","price":10}"#).unwrap();
        assert_eq!(
            spread.resolve(PoolTickSpacing(60)).unwrap(),
            TickRange {
                tick_lower: 20820,
                tick_upper: 24840
            }
        );

        let bounds: RangeSpec =
            serde_json::from_str(r#"{"kind":"bounds","lower":"0.5","upper":2}"#).unwrap();
        assert_eq!(
            bounds.resolve(PoolTickSpacing(60)).unwrap(),
            TickRange {
                tick_lower: -6960,
                tick_upper: 6960
            }
        );
    }
}
