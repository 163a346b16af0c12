//! End-to-end curve construction scenarios.

use std::rc::Rc;

use approx::assert_abs_diff_eq;
use quantcurve::prelude::*;

fn today() -> Date {
    Date::from_ymd(2025, 1, 2).unwrap()
}

fn quote_handle(quote: &Rc<SimpleQuote>) -> Handle<dyn Quote> {
    let q: Rc<dyn Quote> = quote.clone();
    Handle::new(q)
}

fn deposit(quote: &Rc<SimpleQuote>, days: i32) -> Rc<dyn RateHelper> {
    DepositRateHelper::new(
        quote_handle(quote),
        today(),
        today().add_days(days).unwrap(),
        Actual360,
    )
    .unwrap()
}

/// Money-market deposits quoted on 2025-01-02.
fn deposit_market() -> (Vec<Rc<SimpleQuote>>, Vec<Rc<dyn RateHelper>>) {
    let quotes = vec![
        SimpleQuote::new(0.0458),
        SimpleQuote::new(0.04557),
        SimpleQuote::new(0.04496),
    ];
    let helpers = vec![
        deposit(&quotes[0], 30),
        deposit(&quotes[1], 91),
        deposit(&quotes[2], 182),
    ];
    (quotes, helpers)
}

fn deposit_curve(
    helpers: Vec<Rc<dyn RateHelper>>,
) -> Rc<PiecewiseYieldCurve<Discount, LogLinear>> {
    PiecewiseYieldCurve::new(
        today(),
        helpers,
        Discount::default(),
        LogLinear,
        Actual360,
        BootstrapConfig::default(),
    )
    .unwrap()
}

#[test]
fn deposit_curve_reprices_the_market() {
    let (_quotes, helpers) = deposit_market();
    let curve = deposit_curve(helpers);

    for (days, rate) in [(30, 0.0458), (91, 0.04557), (182, 0.04496)] {
        let maturity = today().add_days(days).unwrap();
        let tau = days as f64 / 360.0;
        let df = curve.discount(maturity, false).unwrap();
        assert_abs_diff_eq!((1.0 / df - 1.0) / tau, rate, epsilon = 1e-10);
    }
}

#[test]
fn bootstrap_runs_once_and_only_on_demand() {
    let (quotes, helpers) = deposit_market();
    let curve = deposit_curve(helpers);

    assert_eq!(curve.bootstrap_count(), 0, "construction must not compute");

    let maturity = today().add_days(91).unwrap();
    let df1 = curve.discount(maturity, false).unwrap();
    curve.zero_rate(maturity, false).unwrap();
    curve.forward_rate_time(0.1, 0.3, false).unwrap();
    assert_eq!(curve.bootstrap_count(), 1, "queries share one bootstrap");

    // Bump the 3M quote by one basis point.
    quotes[1].set_value(0.04567);
    assert_eq!(curve.bootstrap_count(), 1, "invalidation is lazy");

    let df2 = curve.discount(maturity, false).unwrap();
    assert_eq!(curve.bootstrap_count(), 2);
    assert!(df2 < df1, "higher deposit rate lowers the discount");
}

#[test]
fn unrelated_nodes_stay_put_under_local_interpolation() {
    let (quotes, helpers) = deposit_market();
    let curve = deposit_curve(helpers);

    let nodes_before = curve.nodes().unwrap();
    quotes[2].set_value(0.046);
    let nodes_after = curve.nodes().unwrap();

    // Log-linear is local: repricing the 6M deposit only moves its node.
    for (before, after) in nodes_before.iter().zip(&nodes_after).take(3) {
        assert_abs_diff_eq!(before.1, after.1, epsilon = 1e-14);
    }
    assert!(nodes_after[3].1 != nodes_before[3].1);
}

#[test]
fn mixed_curve_with_fras_and_swaps() {
    let depo_quote = SimpleQuote::new(0.0450);
    let fra_quote = SimpleQuote::new(0.0442);
    let swap2y_quote = SimpleQuote::new(0.0435);
    let swap3y_quote = SimpleQuote::new(0.0428);

    let fra_start = today().advance(Period::months(6)).unwrap();
    let fra_end = today().advance(Period::months(12)).unwrap();
    let helpers: Vec<Rc<dyn RateHelper>> = vec![
        DepositRateHelper::new(
            quote_handle(&depo_quote),
            today(),
            fra_start,
            Actual360,
        )
        .unwrap(),
        FraRateHelper::new(quote_handle(&fra_quote), fra_start, fra_end, Actual360).unwrap(),
        SwapRateHelper::new(
            quote_handle(&swap2y_quote),
            today(),
            Period::years(2),
            Period::months(6),
            Thirty360,
        )
        .unwrap(),
        SwapRateHelper::new(
            quote_handle(&swap3y_quote),
            today(),
            Period::years(3),
            Period::months(6),
            Thirty360,
        )
        .unwrap(),
    ];

    let curve = PiecewiseYieldCurve::new(
        today(),
        helpers.clone(),
        Discount::default(),
        LogLinear,
        Actual360,
        BootstrapConfig::default(),
    )
    .unwrap();

    // Every instrument must reprice to its quote on the finished curve.
    let nodes = curve.nodes().unwrap();
    let times = curve.times().unwrap();
    let values: Vec<f64> = nodes.iter().map(|n| n.1).collect();
    let interp = LogLinear.interpolate(&times, &values).unwrap();
    let traits = Discount::default();
    let trial = TrialCurve::new(today(), &Actual360, &interp, &traits);
    for (helper, quote) in helpers.iter().zip([
        &depo_quote,
        &fra_quote,
        &swap2y_quote,
        &swap3y_quote,
    ]) {
        let implied = helper.implied_quote(&trial).unwrap();
        assert_abs_diff_eq!(implied, quote.value().unwrap(), epsilon = 1e-9);
    }

    // Discounts decrease out to the 3Y pillar.
    for pair in nodes.windows(2) {
        assert!(pair[1].1 < pair[0].1);
    }
}

#[test]
fn cubic_zero_curve_converges_and_reprices() {
    let (_quotes, helpers) = deposit_market();
    let curve = PiecewiseYieldCurve::new(
        today(),
        helpers,
        ZeroYield,
        NaturalCubic,
        Actual360,
        BootstrapConfig::default(),
    )
    .unwrap();

    for (days, rate) in [(30, 0.0458), (91, 0.04557), (182, 0.04496)] {
        let maturity = today().add_days(days).unwrap();
        let tau = days as f64 / 360.0;
        let df = curve.discount(maturity, false).unwrap();
        assert_abs_diff_eq!((1.0 / df - 1.0) / tau, rate, epsilon = 1e-9);
    }
    assert_eq!(curve.bootstrap_count(), 1);
}

#[test]
fn relinkable_handle_swaps_curves_under_consumers() {
    let flat = FlatForward::from_rate(today(), 0.05, Actual365Fixed);
    let relinkable: RelinkableHandle<dyn YieldTermStructure> = RelinkableHandle::new(flat);
    let handle = relinkable.handle();

    let maturity = today().add_days(365).unwrap();
    let df_flat = handle.value().discount(maturity, false).unwrap();
    assert_abs_diff_eq!(df_flat, (-0.05_f64).exp(), epsilon = 1e-12);

    let (_quotes, helpers) = deposit_market();
    let bootstrapped = deposit_curve(helpers);
    relinkable.link_to(bootstrapped);

    let df_boot = handle.value().discount_time(0.25, true).unwrap();
    assert!(df_boot > 0.0 && df_boot < 1.0);
    assert!(df_boot != df_flat);
}

#[test]
fn derived_quote_drives_the_curve() {
    // Quote published as a percentage; the helper needs a decimal.
    let percent = SimpleQuote::new(4.58);
    let decimal = DerivedQuote::new(quote_handle(&percent), |v| v / 100.0);
    let decimal_handle: Handle<dyn Quote> = {
        let q: Rc<dyn Quote> = decimal;
        Handle::new(q)
    };

    let maturity = today().add_days(91).unwrap();
    let helpers: Vec<Rc<dyn RateHelper>> = vec![DepositRateHelper::new(
        decimal_handle,
        today(),
        maturity,
        Actual360,
    )
    .unwrap()];
    let curve = deposit_curve(helpers);

    let tau = 91.0 / 360.0;
    let df = curve.discount(maturity, false).unwrap();
    assert_abs_diff_eq!((1.0 / df - 1.0) / tau, 0.0458, epsilon = 1e-10);
    assert_eq!(curve.bootstrap_count(), 1);

    // Updating the percentage quote flows through the derived quote.
    percent.set_value(4.60);
    let df = curve.discount(maturity, false).unwrap();
    assert_abs_diff_eq!((1.0 / df - 1.0) / tau, 0.0460, epsilon = 1e-10);
    assert_eq!(curve.bootstrap_count(), 2);
}

#[test]
fn out_of_range_queries_need_extrapolation() {
    let (_quotes, helpers) = deposit_market();
    let curve = deposit_curve(helpers);

    let beyond = today().add_days(400).unwrap();
    assert!(curve.discount(beyond, false).is_err());
    let df = curve.discount(beyond, true).unwrap();
    assert!(df > 0.0 && df < 1.0);
}
