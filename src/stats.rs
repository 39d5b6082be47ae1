use crate::error::Error;

/// Block length for the longest-run-of-ones test.
pub const LONGEST_RUN_BLOCK_LEN: usize = 8;

/// Category probabilities for M = 8: longest run <=1, 2, 3, >=4.
const LONGEST_RUN_PI: [f64; 4] = [0.2148, 0.3672, 0.2305, 0.2266];

/// Result of a single statistical test.
pub struct TestResult {
    pub name: &'static str,
    pub passed: bool,
    pub p_value: f64,
    pub detail: String,
}

impl TestResult {
    fn new(name: &'static str, p_value: f64, significance: f64, detail: String) -> Self {
        Self {
            name,
            passed: p_value >= significance,
            p_value,
            detail,
        }
    }
}

/// Results of all three tests on one sequence.
pub struct SuiteResult {
    pub frequency: TestResult,
    pub runs: TestResult,
    pub longest_run: TestResult,
}

impl SuiteResult {
    pub fn all_passed(&self) -> bool {
        self.frequency.passed && self.runs.passed && self.longest_run.passed
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        [&self.frequency, &self.runs, &self.longest_run].into_iter()
    }
}

/// Converts a '0'/'1' string into bits, rejecting anything else.
pub fn parse_bits(sequence: &str) -> Result<Vec<u8>, Error> {
    if sequence.is_empty() {
        return Err(Error::InvalidSequence("sequence is empty".into()));
    }
    sequence
        .char_indices()
        .map(|(i, c)| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(Error::InvalidSequence(format!(
                "unexpected character {:?} at position {}",
                other, i
            ))),
        })
        .collect()
}

/// Frequency (monobit) test.
/// p = erfc(|S| / sqrt(2n)) where S sums +1 for each one and -1 for each zero.
pub fn frequency_test(bits: &[u8], significance: f64) -> TestResult {
    let n = bits.len() as f64;
    let sum: i64 = bits.iter().map(|&b| if b == 1 { 1i64 } else { -1 }).sum();
    let s_obs = (sum.abs() as f64) / n.sqrt();
    let p_value = erfc(s_obs / 2f64.sqrt());
    TestResult::new(
        "Frequency",
        p_value,
        significance,
        format!("partial sum: {}", sum),
    )
}

/// Runs test: counts uninterrupted runs of identical bits.
/// Fails outright (p = 0) when the proportion of ones is too far from 1/2.
pub fn runs_test(bits: &[u8], significance: f64) -> TestResult {
    let n = bits.len() as f64;
    let ones = bits.iter().filter(|&&b| b == 1).count() as f64;
    let pi = ones / n;
    let tau = 2.0 / n.sqrt();

    if (pi - 0.5).abs() >= tau || ones == 0.0 || ones == n {
        return TestResult::new(
            "Runs",
            0.0,
            significance,
            format!("pre-test failed: proportion of ones {:.4}", pi),
        );
    }

    let v_obs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let expected = 2.0 * n * pi * (1.0 - pi);
    let p_value =
        erfc((v_obs as f64 - expected).abs() / (2.0 * (2.0 * n).sqrt() * pi * (1.0 - pi)));
    TestResult::new(
        "Runs",
        p_value,
        significance,
        format!("runs: {}", v_obs),
    )
}

/// Longest run of ones in 8-bit blocks. A trailing partial block is ignored.
pub fn longest_run_test(bits: &[u8], significance: f64) -> Result<TestResult, Error> {
    let blocks = bits.len() / LONGEST_RUN_BLOCK_LEN;
    if blocks == 0 {
        return Err(Error::InvalidSequence(format!(
            "longest-run test needs at least {} bits, got {}",
            LONGEST_RUN_BLOCK_LEN,
            bits.len()
        )));
    }

    let mut v = [0u32; 4];
    for block in bits.chunks_exact(LONGEST_RUN_BLOCK_LEN) {
        let mut longest = 0usize;
        let mut run = 0usize;
        for &b in block {
            run = if b == 1 { run + 1 } else { 0 };
            longest = longest.max(run);
        }
        v[longest.clamp(1, 4) - 1] += 1;
    }

    let n = blocks as f64;
    let chi_sq: f64 = v
        .iter()
        .zip(LONGEST_RUN_PI.iter())
        .map(|(&obs, &p)| {
            let expected = n * p;
            let diff = obs as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let p_value = igamc(1.5, chi_sq / 2.0);
    Ok(TestResult::new(
        "Longest Run",
        p_value,
        significance,
        format!(
            "blocks: {} categories: [{}, {}, {}, {}] chi-square: {:.4}",
            blocks, v[0], v[1], v[2], v[3], chi_sq
        ),
    ))
}

/// Run all three tests on a '0'/'1' sequence.
pub fn run_suite(sequence: &str, significance: f64) -> Result<SuiteResult, Error> {
    let bits = parse_bits(sequence)?;
    if bits.len() < 128 {
        log::warn!(
            "sequence of {} bits is shorter than the recommended 128",
            bits.len()
        );
    }
    Ok(SuiteResult {
        frequency: frequency_test(&bits, significance),
        runs: runs_test(&bits, significance),
        longest_run: longest_run_test(&bits, significance)?,
    })
}

/// Complementary error function, via erfc(x) = Q(1/2, x^2).
pub fn erfc(x: f64) -> f64 {
    let q = igamc(0.5, x * x);
    if x >= 0.0 {
        q
    } else {
        2.0 - q
    }
}

const GAMMA_EPS: f64 = 1e-15;
const GAMMA_FPMIN: f64 = 1e-300;
const GAMMA_MAX_ITER: usize = 500;

/// Natural log of the gamma function (Lanczos approximation).
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000000000190015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }
    -tmp + (2.5066282746310005 * ser / x).ln()
}

/// Regularized upper incomplete gamma function Q(a, x).
pub fn igamc(a: f64, x: f64) -> f64 {
    if x <= 0.0 || a <= 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - igam_series(a, x)
    } else {
        igamc_continued_fraction(a, x)
    }
}

/// Lower regularized gamma P(a, x) by series expansion.
fn igam_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..GAMMA_MAX_ITER {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * GAMMA_EPS {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Upper regularized gamma Q(a, x) by Lentz's continued fraction.
fn igamc_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / GAMMA_FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=GAMMA_MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < GAMMA_FPMIN {
            d = GAMMA_FPMIN;
        }
        c = b + an / c;
        if c.abs() < GAMMA_FPMIN {
            c = GAMMA_FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < GAMMA_EPS {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHA: f64 = 0.01;

    fn bits(s: &str) -> Vec<u8> {
        parse_bits(s).unwrap()
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-6
    }

    // --- erfc / igamc ---

    #[test]
    fn test_erfc_known_values() {
        assert!(close(erfc(0.0), 1.0));
        assert!(close(erfc(0.5), 0.4795001221869535));
        assert!(close(erfc(-0.5), 1.5204998778130465));
        assert!(erfc(6.0) < 1e-15);
    }

    #[test]
    fn test_igamc_bounds() {
        assert_eq!(igamc(1.5, 0.0), 1.0);
        // Q(1, x) = exp(-x)
        assert!(close(igamc(1.0, 2.0), (-2.0f64).exp()));
        assert!(close(igamc(1.0, 0.3), (-0.3f64).exp()));
    }

    // --- parse_bits ---

    #[test]
    fn test_parse_bits_rejects_empty() {
        assert!(matches!(parse_bits(""), Err(Error::InvalidSequence(_))));
    }

    #[test]
    fn test_parse_bits_rejects_other_characters() {
        let err = parse_bits("0102").unwrap_err();
        assert!(format!("{}", err).contains("position 3"));
    }

    // --- Frequency ---

    #[test]
    fn test_frequency_reference_sequence() {
        let result = frequency_test(&bits("1011010101"), ALPHA);
        assert!(close(result.p_value, 0.5270892568655381), "{}", result.p_value);
        assert!(result.passed);
    }

    #[test]
    fn test_frequency_all_ones_fails() {
        let result = frequency_test(&vec![1u8; 128], ALPHA);
        assert!(!result.passed);
        assert!(result.p_value < 1e-20);
    }

    // --- Runs ---

    #[test]
    fn test_runs_reference_sequence() {
        let result = runs_test(&bits("1001101011"), ALPHA);
        assert!(close(result.p_value, 0.1472322553636657), "{}", result.p_value);
        assert_eq!(result.detail, "runs: 7");
    }

    #[test]
    fn test_runs_pretest_failure() {
        let result = runs_test(&vec![1u8; 100], ALPHA);
        assert_eq!(result.p_value, 0.0);
        assert!(!result.passed);
        assert!(result.detail.contains("pre-test"));
    }

    #[test]
    fn test_runs_short_constant_sequence() {
        // Too short for the proportion pre-test to reject on its own
        let result = runs_test(&bits("1111"), ALPHA);
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_runs_alternating_fails() {
        let alternating: Vec<u8> = (0..128).map(|i| (i % 2) as u8).collect();
        let result = runs_test(&alternating, ALPHA);
        assert!(!result.passed);
    }

    // --- Longest Run ---

    #[test]
    fn test_longest_run_reference_sequence() {
        let seq = "11001100000101010110110001001100111000000000001001001101010100010001\
                   001111010110100000001101011111001100111001101101100010110010";
        assert_eq!(seq.len(), 128);
        let result = longest_run_test(&bits(seq), ALPHA).unwrap();
        assert!(result.detail.contains("categories: [4, 9, 3, 0]"), "{}", result.detail);
        assert!((result.p_value - 0.138148674845701).abs() < 1e-5, "{}", result.p_value);
        assert!(result.passed);
    }

    #[test]
    fn test_longest_run_ignores_partial_block() {
        let full = longest_run_test(&bits("0110100111010010"), ALPHA).unwrap();
        let partial = longest_run_test(&bits("0110100111010010111"), ALPHA).unwrap();
        assert_eq!(full.p_value, partial.p_value);
    }

    #[test]
    fn test_longest_run_too_short() {
        assert!(longest_run_test(&bits("0101"), ALPHA).is_err());
    }

    #[test]
    fn test_longest_run_all_ones_fails() {
        let result = longest_run_test(&vec![1u8; 128], ALPHA).unwrap();
        assert!(!result.passed);
    }

    // --- Suite ---

    #[test]
    fn test_suite_chacha_generator_passes() {
        use crate::generator::BitGenerator;

        let seq = BitGenerator::from_seed(42).collect(10_000);
        let result = run_suite(&seq, ALPHA).unwrap();
        for test in result.iter() {
            assert!(
                test.p_value > 1e-4 && test.p_value <= 1.0 + 1e-9,
                "{}: {} ({})",
                test.name,
                test.p_value,
                test.detail
            );
        }
    }

    #[test]
    fn test_suite_rejects_invalid_sequence() {
        assert!(run_suite("01x1", ALPHA).is_err());
    }
}
