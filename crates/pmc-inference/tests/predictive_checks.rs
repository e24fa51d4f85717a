//! Posterior predictive checks: calibration under a correct model, power
//! under a misspecified one.

use pmc_core::EmpiricalSample;
use pmc_inference::statistics::{self, Statistic};
use pmc_inference::{PredictiveCheck, Tail, sample, sample_parallel};
use pmc_prob::{Family, Gamma, Normal};

fn constant(v: f64, n: usize) -> EmpiricalSample {
    EmpiricalSample::observed(vec![v; n]).unwrap()
}

#[test]
fn test_self_consistent_p_values_average_one_half() {
    let truth = Normal::new(0.0, 1.0).unwrap();
    let mu = constant(0.0, 200);
    let sigma = constant(1.0, 200);

    let trials = 100u64;
    let mut sum = 0.0;
    for t in 0..trials {
        let observed = sample(&truth, 30, Some(10_000 + t)).unwrap();
        let r = PredictiveCheck::new(Tail::Greater, Some(t))
            .check(&[&mu, &sigma], &Family::Normal, observed.values(), &statistics::mean)
            .unwrap();
        // Continuous statistic: ties have probability zero.
        assert!((r.p_greater + r.p_less - 1.0).abs() < 1e-12);
        sum += r.p_value;
    }
    let avg = sum / trials as f64;
    assert!((avg - 0.5).abs() < 0.1, "average p-value {avg}");
}

#[test]
fn test_posterior_draws_drive_replicates() {
    // Gamma posterior over a Poisson rate, data consistent with it.
    let post = Gamma::new(40.0, 10.0).unwrap();
    let lambda = sample_parallel(&post, 2_000, Some(4)).unwrap();
    let observed = [3.0, 5.0, 4.0, 2.0, 6.0, 4.0, 3.0, 5.0, 4.0, 4.0];
    let r = PredictiveCheck::new(Tail::TwoSided, Some(9))
        .check_named(&[&lambda], &Family::Poisson, &observed, "mean", &|xs| {
            Statistic::Mean.eval(xs)
        })
        .unwrap();
    assert!(r.p_value > 0.05, "well-specified model flagged: p={}", r.p_value);
    assert_eq!(r.simulated.len(), 2_000);
}

#[test]
fn test_zero_inflation_is_detected() {
    let lambda = constant(3.0, 1_000);
    let mut observed = vec![0.0; 25];
    observed.extend(std::iter::repeat(5.0).take(25));
    let r = PredictiveCheck::new(Tail::Greater, Some(1))
        .check_named(&[&lambda], &Family::Poisson, &observed, "zero_fraction", &|xs| {
            Statistic::ZeroFraction.eval(xs)
        })
        .unwrap();
    assert!(r.p_value < 0.01, "p={}", r.p_value);
    assert_eq!(r.observed, 0.5);
}
