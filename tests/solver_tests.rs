use approx::assert_abs_diff_eq;
use ivsurface::{
    bs_price, initial_guess, solve_implied_vol, ImpliedVolInput, OptionKind, SolverConfig,
    SolverMethod, SurfaceError,
};
use proptest::prelude::*;

const ALL_METHODS: [SolverMethod; 3] = [
    SolverMethod::DampedSecant,
    SolverMethod::NewtonRaphson,
    SolverMethod::Brent,
];

fn atm_input(price: f64) -> ImpliedVolInput {
    ImpliedVolInput::new(price, 100.0, 100.0, 1.0, 0.05, OptionKind::Call)
}

/// The reference price 10.4506 inverts back to σ = 0.2 with every strategy.
#[test]
fn test_round_trip_reference_price() {
    for method in ALL_METHODS {
        let config = SolverConfig::default().with_method(method);
        let iv = solve_implied_vol(&atm_input(10.4506), &config)
            .unwrap_or_else(|e| panic!("{method:?} failed: {e}"));
        assert_abs_diff_eq!(iv.vol, 0.2, epsilon = 1e-4);
        assert!(iv.iterations >= 1);
    }
}

/// Puts invert as well as calls.
#[test]
fn test_round_trip_put() {
    let price = bs_price(100.0, 110.0, 0.5, 0.05, 0.35, OptionKind::Put).unwrap();
    let input = ImpliedVolInput::new(price, 100.0, 110.0, 0.5, 0.05, OptionKind::Put);
    let iv = solve_implied_vol(&input, &SolverConfig::default()).unwrap();
    assert_abs_diff_eq!(iv.vol, 0.35, epsilon = 1e-5);
}

/// The seed scales with moneyness: ×0.8 above strike, ×1.2 below, unchanged at the money.
#[test]
fn test_initial_guess_moneyness_adjustment() {
    let config = SolverConfig::default();
    let base = (2.0 * std::f64::consts::PI / 0.5).sqrt() * 6.0 / 100.0;

    let atm = ImpliedVolInput::new(6.0, 100.0, 100.0, 0.5, 0.05, OptionKind::Call);
    assert_abs_diff_eq!(initial_guess(&atm, &config), base, epsilon = 1e-12);

    let itm = ImpliedVolInput::new(6.0, 100.0, 90.0, 0.5, 0.05, OptionKind::Call);
    assert_abs_diff_eq!(initial_guess(&itm, &config), base * 0.8, epsilon = 1e-12);

    let otm = ImpliedVolInput::new(6.0, 100.0, 110.0, 0.5, 0.05, OptionKind::Call);
    assert_abs_diff_eq!(initial_guess(&otm, &config), base * 1.2, epsilon = 1e-12);

    // Tiny prices hit the floor before the moneyness factor is applied
    let cheap = ImpliedVolInput::new(1e-6, 100.0, 100.0, 0.5, 0.05, OptionKind::Call);
    assert_abs_diff_eq!(initial_guess(&cheap, &config), 0.01, epsilon = 1e-15);
}

/// Zero, negative and non-finite prices are invalid inputs.
#[test]
fn test_non_positive_price_is_rejected() {
    for price in [0.0, -1.0, f64::NAN] {
        let err = solve_implied_vol(&atm_input(price), &SolverConfig::default()).unwrap_err();
        assert!(
            matches!(err, SurfaceError::InvalidParameters { .. }),
            "price {price}: {err}"
        );
    }
}

/// Prices at or above the theoretical maximum (or below intrinsic) cannot be inverted.
#[test]
fn test_price_outside_no_arbitrage_bounds() {
    let config = SolverConfig::default();

    for price in [100.0, 150.0] {
        let err = solve_implied_vol(&atm_input(price), &config).unwrap_err();
        assert!(matches!(err, SurfaceError::PriceOutOfBounds { .. }), "{err}");
    }

    // Deep ITM call quoted below S − K·e^(−rT)
    let below = ImpliedVolInput::new(40.0, 100.0, 50.0, 1.0, 0.05, OptionKind::Call);
    match solve_implied_vol(&below, &config).unwrap_err() {
        SurfaceError::PriceOutOfBounds { lower, upper, .. } => {
            assert_abs_diff_eq!(lower, 100.0 - 50.0 * (-0.05_f64).exp(), epsilon = 1e-12);
            assert_abs_diff_eq!(upper, 100.0, epsilon = 1e-12);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Put above the discounted strike
    let put = ImpliedVolInput::new(96.0, 100.0, 100.0, 1.0, 0.05, OptionKind::Put);
    assert!(matches!(
        solve_implied_vol(&put, &config).unwrap_err(),
        SurfaceError::PriceOutOfBounds { .. }
    ));
}

/// Non-positive maturity never reaches the pricing formula.
#[test]
fn test_non_positive_maturity_is_rejected() {
    let input = ImpliedVolInput::new(5.0, 100.0, 100.0, 0.0, 0.05, OptionKind::Call);
    assert!(matches!(
        solve_implied_vol(&input, &SolverConfig::default()).unwrap_err(),
        SurfaceError::InvalidParameters { .. }
    ));
}

/// Deep ITM call with a tiny maturity: the price is flat in σ, so the secant
/// keeps perturbing. The solver must still stop within its budget.
#[test]
fn test_deep_itm_short_maturity_terminates() {
    let price = bs_price(100.0, 1.0, 0.01, 0.05, 0.2, OptionKind::Call).unwrap();
    let input = ImpliedVolInput::new(price, 100.0, 1.0, 0.01, 0.05, OptionKind::Call);

    for method in ALL_METHODS {
        let config = SolverConfig::default().with_method(method);
        match solve_implied_vol(&input, &config) {
            Ok(iv) => {
                assert!(iv.vol >= config.vol_min && iv.vol <= config.vol_max);
                assert!(iv.iterations <= config.max_iterations);
            }
            Err(SurfaceError::ImpliedVolNotConverged {
                iterations, strike, ..
            }) => {
                assert!(iterations <= config.max_iterations);
                assert_eq!(strike, 1.0);
            }
            Err(SurfaceError::VolOutOfBounds { .. }) => {
                assert_eq!(method, SolverMethod::Brent);
            }
            Err(other) => panic!("{method:?}: unexpected error {other}"),
        }
    }
}

/// Plain Newton gives up where vega vanishes; the damped secant does not divide by it.
#[test]
fn test_newton_stops_on_vanishing_vega() {
    let price = bs_price(100.0, 1.0, 0.01, 0.05, 0.2, OptionKind::Call).unwrap();
    let input = ImpliedVolInput::new(price, 100.0, 1.0, 0.01, 0.05, OptionKind::Call);
    let config = SolverConfig::default().with_method(SolverMethod::NewtonRaphson);

    let err = solve_implied_vol(&input, &config).unwrap_err();
    assert!(matches!(err, SurfaceError::ImpliedVolNotConverged { .. }), "{err}");
}

/// A price whose implied vol exceeds the band is pinned to the upper clamp by
/// the secant and reported as out of bounds by Brent.
#[test]
fn test_vol_beyond_band() {
    let input = atm_input(99.5);

    let secant = solve_implied_vol(&input, &SolverConfig::default()).unwrap();
    assert_eq!(secant.vol, 5.0);

    let brent_config = SolverConfig::default().with_method(SolverMethod::Brent);
    assert!(matches!(
        solve_implied_vol(&input, &brent_config).unwrap_err(),
        SurfaceError::VolOutOfBounds { .. }
    ));
}

/// A budget too small to converge yields a typed failure carrying the context.
#[test]
fn test_iteration_budget_exhausted() {
    let config = SolverConfig::default().with_max_iterations(2);
    match solve_implied_vol(&atm_input(10.4506), &config).unwrap_err() {
        SurfaceError::ImpliedVolNotConverged {
            strike,
            time_to_expiry,
            iterations,
            last_vol,
        } => {
            assert_eq!(strike, 100.0);
            assert_eq!(time_to_expiry, 1.0);
            assert!(iterations <= 2);
            assert!(last_vol.is_finite());
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Custom clamp bounds are honoured.
#[test]
fn test_custom_bounds() {
    let config = SolverConfig::default().with_bounds(0.25, 2.0);
    // True vol is 0.2, below the configured floor
    let iv = solve_implied_vol(&atm_input(10.4506), &config).unwrap();
    assert_eq!(iv.vol, 0.25);
}

proptest! {
    /// Moderate-moneyness quotes invert back to their generating volatility.
    #[test]
    fn secant_recovers_generating_vol(
        k in 90.0_f64..110.0,
        t in 0.25_f64..2.0,
        sigma in 0.15_f64..0.6,
        is_call in any::<bool>(),
    ) {
        let kind = if is_call { OptionKind::Call } else { OptionKind::Put };
        let price = bs_price(100.0, k, t, 0.05, sigma, kind).unwrap();
        let input = ImpliedVolInput::new(price, 100.0, k, t, 0.05, kind);
        let iv = solve_implied_vol(&input, &SolverConfig::default()).unwrap();
        prop_assert!((iv.vol - sigma).abs() < 1e-4, "recovered {} vs {}", iv.vol, sigma);
    }

    /// Whatever the input, a successful result lies inside the clamp band.
    #[test]
    fn successful_vol_within_band(
        price in 0.001_f64..120.0,
        k in 1.0_f64..300.0,
        t in 0.001_f64..5.0,
        is_call in any::<bool>(),
        method_idx in 0usize..3,
    ) {
        let kind = if is_call { OptionKind::Call } else { OptionKind::Put };
        let config = SolverConfig::default().with_method(ALL_METHODS[method_idx]);
        let input = ImpliedVolInput::new(price, 100.0, k, t, 0.05, kind);
        if let Ok(iv) = solve_implied_vol(&input, &config) {
            prop_assert!(iv.vol >= 0.01 && iv.vol <= 5.0, "vol {} outside band", iv.vol);
        }
    }
}
