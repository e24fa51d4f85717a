//! Property tests for index-aligned transforms.

use pmc_core::{EmpiricalSample, Error};
use pmc_inference::Op;
use pmc_inference::transform::{apply, difference};
use proptest::prelude::*;

fn obs(v: Vec<f64>) -> EmpiricalSample {
    EmpiricalSample::observed(v).unwrap()
}

proptest! {
    #[test]
    fn prop_aligned_output_pairs_by_index(
        pairs in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 1..100),
    ) {
        let (a, b): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        let sa = obs(a.clone());
        let sb = obs(b.clone());
        let d = difference(&sa, &sb).unwrap();
        prop_assert_eq!(d.len(), a.len());
        for i in 0..a.len() {
            prop_assert_eq!(d.values()[i], a[i] - b[i]);
        }
    }

    #[test]
    fn prop_length_mismatch_is_reported(
        n in 1usize..50,
        m in 1usize..50,
        extra in 0usize..3,
    ) {
        prop_assume!(n != m);
        let base = obs(vec![1.0; n]);
        let same: Vec<EmpiricalSample> = (0..extra).map(|_| obs(vec![2.0; n])).collect();
        let odd = obs(vec![3.0; m]);

        let mut inputs: Vec<&EmpiricalSample> = vec![&base];
        inputs.extend(same.iter());
        inputs.push(&odd);

        let err = Op::Sum.apply(&inputs).unwrap_err();
        prop_assert_eq!(err, Error::MisalignedSample { input: extra + 1, expected: n, got: m });
    }

    #[test]
    fn prop_sum_matches_row_sums(
        rows in prop::collection::vec(prop::collection::vec(-10.0f64..10.0, 3), 1..40),
    ) {
        let cols: Vec<EmpiricalSample> =
            (0..3).map(|k| obs(rows.iter().map(|r| r[k]).collect())).collect();
        let refs: Vec<&EmpiricalSample> = cols.iter().collect();
        let s = apply("sum3", |x| x.iter().sum(), &refs).unwrap();
        for (i, r) in rows.iter().enumerate() {
            let expect: f64 = r.iter().sum();
            prop_assert!((s.values()[i] - expect).abs() < 1e-12);
        }
    }
}
