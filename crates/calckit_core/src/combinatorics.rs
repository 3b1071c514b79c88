//! Counting and enumeration of arrangements.
//!
//! Counts are exact (`u128`) while they fit; past that they degrade to a
//! base-10 logarithm so that e.g. `1000!` is still reportable. Enumeration is
//! recursive and capped at [`MAX_ENUMERATION_ITEMS`] because its output grows
//! factorially.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::special::{ln_factorial, ln_gamma};

/// Hard limit on the number of items [`generate_permutations`] and
/// [`generate_combinations`] accept
pub const MAX_ENUMERATION_ITEMS: usize = 5;

/// Largest `n` (and `r`) the closed-form counts accept from user input
pub const MAX_COUNT_N: u64 = 1_000_000;

/// Largest `n` a [`StirlingTable`] will grow to
pub const MAX_STIRLING_N: usize = 1000;

/// The result of a counting formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Count {
    Exact(u128),
    /// Too large for `u128`; only the magnitude is kept
    Approximate { log10: f64 },
}

impl Count {
    pub const ZERO: Count = Count::Exact(0);
    pub const ONE: Count = Count::Exact(1);

    fn from_log10(log10: f64) -> Self {
        Count::Approximate { log10 }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Count::Exact(_))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Count::Exact(0))
    }

    /// Value as a float; `inf` when beyond `f64` range
    pub fn as_f64(&self) -> f64 {
        match *self {
            Count::Exact(n) => n as f64,
            Count::Approximate { log10 } => 10f64.powf(log10),
        }
    }

    /// Base-10 logarithm of the count (`-inf` for zero)
    pub fn log10(&self) -> f64 {
        match *self {
            Count::Exact(n) => (n as f64).log10(),
            Count::Approximate { log10 } => log10,
        }
    }

    pub fn add(self, other: Count) -> Count {
        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return self;
        }
        if let (Count::Exact(a), Count::Exact(b)) = (self, other) {
            if let Some(sum) = a.checked_add(b) {
                return Count::Exact(sum);
            }
        }
        let (hi, lo) = if self.log10() >= other.log10() {
            (self.log10(), other.log10())
        } else {
            (other.log10(), self.log10())
        };
        Count::from_log10(hi + (1.0 + 10f64.powf(lo - hi)).log10())
    }

    pub fn mul(self, other: Count) -> Count {
        if self.is_zero() || other.is_zero() {
            return Count::ZERO;
        }
        if let (Count::Exact(a), Count::Exact(b)) = (self, other) {
            if let Some(product) = a.checked_mul(b) {
                return Count::Exact(product);
            }
        }
        Count::from_log10(self.log10() + other.log10())
    }

    pub fn scale(self, factor: u64) -> Count {
        self.mul(Count::Exact(factor as u128))
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Count::Exact(n) => write!(f, "{n}"),
            Count::Approximate { log10 } => {
                let exponent = log10.floor();
                let mantissa = 10f64.powf(log10 - exponent);
                write!(f, "≈{mantissa:.6}e+{exponent:.0}")
            }
        }
    }
}

fn ln_to_count(ln_value: f64) -> Count {
    Count::from_log10(ln_value / std::f64::consts::LN_10)
}

/// n!
pub fn factorial(n: u64) -> Count {
    let mut acc: u128 = 1;
    for i in 2..=n as u128 {
        match acc.checked_mul(i) {
            Some(next) => acc = next,
            None => return ln_to_count(ln_factorial(n)),
        }
    }
    Count::Exact(acc)
}

/// P(n, r) = n! / (n − r)!; zero when r > n
pub fn permutations(n: u64, r: u64) -> Count {
    if r > n {
        return Count::ZERO;
    }
    let mut acc: u128 = 1;
    for i in (n - r + 1)..=n {
        match acc.checked_mul(i as u128) {
            Some(next) => acc = next,
            None => return ln_to_count(ln_factorial(n) - ln_factorial(n - r)),
        }
    }
    Count::Exact(acc)
}

/// C(n, r) = n! / (r! (n − r)!); zero when r > n
pub fn combinations(n: u64, r: u64) -> Count {
    if r > n {
        return Count::ZERO;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // acc·(n−i)/(i+1) is C(n, i+1), always integral. Cancelling the
        // common factor first keeps every intermediate equal to C(n, i+1).
        let numerator = (n - i) as u128;
        let denominator = (i + 1) as u128;
        let g = gcd(acc, denominator);
        let factor = numerator / (denominator / g);
        match (acc / g).checked_mul(factor) {
            Some(next) => acc = next,
            None => {
                return ln_to_count(ln_factorial(n) - ln_factorial(r) - ln_factorial(n - r));
            }
        }
    }
    Count::Exact(acc)
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// n^r: ordered selections with repetition
pub fn permutations_with_repetition(n: u64, r: u64) -> Count {
    if r == 0 {
        return Count::ONE;
    }
    if n == 0 {
        return Count::ZERO;
    }
    match u32::try_from(r)
        .ok()
        .and_then(|r| (n as u128).checked_pow(r))
    {
        Some(v) => Count::Exact(v),
        None => Count::from_log10(r as f64 * (n as f64).log10()),
    }
}

/// C(n + r − 1, r): unordered selections with repetition
pub fn combinations_with_repetition(n: u64, r: u64) -> Count {
    if n == 0 {
        return if r == 0 { Count::ONE } else { Count::ZERO };
    }
    match (n - 1).checked_add(r) {
        Some(top) => combinations(top, r),
        None => ln_to_count(ln_binomial(n as f64 - 1.0 + r as f64, r as f64)),
    }
}

/// (n − 1)!: arrangements around a circle, rotations identified
pub fn circular_permutations(n: u64) -> Count {
    if n == 0 {
        return Count::ZERO;
    }
    factorial(n - 1)
}

/// (Σfᵢ)! / Π(fᵢ!), computed as a product of binomials to stay exact longer
pub fn multiset_permutations(frequencies: &[u64]) -> Count {
    let mut total = 0u64;
    let mut acc = Count::ONE;
    for &f in frequencies {
        let Some(next) = total.checked_add(f) else {
            return multiset_beyond_u64(frequencies);
        };
        total = next;
        acc = acc.mul(combinations(total, f));
    }
    acc
}

fn multiset_beyond_u64(frequencies: &[u64]) -> Count {
    let mut total = 0.0;
    let mut ln_count = 0.0;
    for &f in frequencies {
        total += f as f64;
        ln_count += ln_binomial(total, f as f64);
    }
    ln_to_count(ln_count)
}

/// ln C(top, k) for arguments past `u64`. Summed term by term while the
/// smaller side is short, since differences of huge `ln_gamma` values lose
/// every significant digit there.
fn ln_binomial(top: f64, k: f64) -> f64 {
    let k = k.min(top - k);
    if k <= MAX_COUNT_N as f64 {
        (1..=k as u64)
            .map(|i| ((top - k + i as f64) / i as f64).ln())
            .sum()
    } else {
        ln_gamma(top + 1.0) - ln_gamma(k + 1.0) - ln_gamma(top - k + 1.0)
    }
}

/// Which recurrence a [`StirlingTable`] follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StirlingKind {
    /// Unsigned, permutations of n by number of cycles
    First,
    /// Partitions of an n-set into k non-empty blocks
    Second,
}

/// Memoized Stirling numbers indexed by `(n, k)`.
///
/// Rows are filled bottom-up on demand; each row is derived from the
/// previous one, so a lookup costs O(n²) once and O(1) afterwards.
#[derive(Debug, Clone)]
pub struct StirlingTable {
    kind: StirlingKind,
    rows: Vec<Vec<Count>>,
}

impl StirlingTable {
    pub fn new(kind: StirlingKind) -> Self {
        Self {
            kind,
            rows: vec![vec![Count::ONE]],
        }
    }

    pub fn kind(&self) -> StirlingKind {
        self.kind
    }

    /// Number of rows computed so far
    pub fn rows_computed(&self) -> usize {
        self.rows.len()
    }

    /// S(n, k); zero for k > n
    pub fn get(&mut self, n: usize, k: usize) -> Result<Count, ValidationError> {
        if k > n {
            return Ok(Count::ZERO);
        }
        Ok(self.row(n)?[k])
    }

    /// Every S(n, k) for k in 0..=n
    pub fn row(&mut self, n: usize) -> Result<&[Count], ValidationError> {
        if n > MAX_STIRLING_N {
            return Err(ValidationError::new(
                "n",
                format!("must be at most {MAX_STIRLING_N} for Stirling numbers"),
            ));
        }
        while self.rows.len() <= n {
            let m = self.rows.len();
            let prev = &self.rows[m - 1];
            let mut row = vec![Count::ZERO; m + 1];
            row[m] = Count::ONE;
            for k in 1..m {
                row[k] = match self.kind {
                    StirlingKind::First => prev[k - 1].add(prev[k].scale((m - 1) as u64)),
                    StirlingKind::Second => prev[k].scale(k as u64).add(prev[k - 1]),
                };
            }
            self.rows.push(row);
        }
        Ok(&self.rows[n])
    }
}

/// Bell(n) = Σₖ S2(n, k), the number of partitions of an n-set
pub fn bell(table: &mut StirlingTable, n: usize) -> Result<Count, ValidationError> {
    debug_assert_eq!(table.kind(), StirlingKind::Second);
    Ok(table
        .row(n)?
        .iter()
        .fold(Count::ZERO, |acc, &c| acc.add(c)))
}

fn check_enumerable(len: usize, r: usize) -> Result<(), ValidationError> {
    if len > MAX_ENUMERATION_ITEMS {
        return Err(ValidationError::new(
            "items",
            format!("at most {MAX_ENUMERATION_ITEMS} items can be enumerated"),
        ));
    }
    if r > len {
        return Err(ValidationError::new(
            "r",
            format!("must not exceed the number of items ({len})"),
        ));
    }
    Ok(())
}

/// Every ordering of all `items`
pub fn generate_permutations<T: Clone>(items: &[T]) -> Result<Vec<Vec<T>>, ValidationError> {
    generate_arrangements(items, items.len())
}

/// Every ordered selection of `r` distinct items
pub fn generate_arrangements<T: Clone>(
    items: &[T],
    r: usize,
) -> Result<Vec<Vec<T>>, ValidationError> {
    check_enumerable(items.len(), r)?;

    fn recurse<T: Clone>(
        items: &[T],
        r: usize,
        used: &mut [bool],
        current: &mut Vec<T>,
        out: &mut Vec<Vec<T>>,
    ) {
        if current.len() == r {
            out.push(current.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            current.push(items[i].clone());
            recurse(items, r, used, current, out);
            current.pop();
            used[i] = false;
        }
    }

    let mut out = Vec::new();
    let mut used = vec![false; items.len()];
    recurse(items, r, &mut used, &mut Vec::with_capacity(r), &mut out);
    Ok(out)
}

/// Every unordered selection of `r` distinct items, in input order
pub fn generate_combinations<T: Clone>(
    items: &[T],
    r: usize,
) -> Result<Vec<Vec<T>>, ValidationError> {
    check_enumerable(items.len(), r)?;

    fn recurse<T: Clone>(
        items: &[T],
        start: usize,
        r: usize,
        current: &mut Vec<T>,
        out: &mut Vec<Vec<T>>,
    ) {
        if current.len() == r {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i].clone());
            recurse(items, i + 1, r, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    recurse(items, 0, r, &mut Vec::with_capacity(r), &mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), Count::Exact(1));
        assert_eq!(factorial(5), Count::Exact(120));
        assert_eq!(factorial(20), Count::Exact(2_432_902_008_176_640_000));
        assert!(factorial(34).is_exact());
        let big = factorial(1000);
        assert!(!big.is_exact());
        // 1000! ≈ 4.0239e2567
        assert!((big.log10() - 2567.604_644_222_133).abs() < 1e-6);
        assert!(big.to_string().starts_with("≈4.0238"));
    }

    #[test]
    fn test_permutations_and_combinations() {
        assert_eq!(permutations(5, 3), Count::Exact(60));
        assert_eq!(combinations(5, 3), Count::Exact(10));
        assert_eq!(permutations(4, 2), Count::Exact(12));
        assert_eq!(permutations(5, 0), Count::Exact(1));
        assert_eq!(combinations(5, 6), Count::ZERO);
        assert_eq!(combinations(0, 0), Count::ONE);
        assert_eq!(
            combinations(100, 50),
            Count::Exact(100_891_344_545_564_193_334_812_497_256)
        );
    }

    #[test]
    fn test_combinations_stay_exact_while_the_result_fits() {
        let c128 = combinations(128, 64);
        assert!(c128.is_exact());
        let pascal = combinations(127, 63).add(combinations(127, 64));
        assert_eq!(c128, pascal);
        assert!(combinations(130, 65).is_exact());
        // C(132, 66) ≈ 3.8e38 is past u128::MAX
        assert!(!combinations(132, 66).is_exact());
        assert_eq!(combinations(60, 30), Count::Exact(118_264_581_564_861_424));
    }

    #[test]
    fn test_counts_past_u64_do_not_overflow() {
        let c = combinations_with_repetition(u64::MAX, 2);
        assert!(!c.is_exact());
        // C(2^64, 2) ≈ 2^127
        assert!((c.log10() - 127.0 * 2f64.log10()).abs() < 1e-6);

        let m = multiset_permutations(&[u64::MAX, 1]);
        assert!(!m.is_exact());
        assert!((m.log10() - 64.0 * 2f64.log10()).abs() < 1e-6);
    }

    #[test]
    fn test_combinations_overflow_falls_back() {
        let c = combinations(1000, 500);
        assert!(!c.is_exact());
        // C(1000,500) ≈ 2.7029e299
        assert!((c.log10() - 299.431_8).abs() < 1e-3);
    }

    #[test]
    fn test_repetition_variants() {
        assert_eq!(permutations_with_repetition(3, 2), Count::Exact(9));
        assert_eq!(permutations_with_repetition(0, 0), Count::ONE);
        assert_eq!(permutations_with_repetition(0, 2), Count::ZERO);
        assert_eq!(combinations_with_repetition(3, 2), Count::Exact(6));
        assert_eq!(combinations_with_repetition(0, 0), Count::ONE);
        assert!(!permutations_with_repetition(10, 100).is_exact());
    }

    #[test]
    fn test_circular_and_multiset() {
        assert_eq!(circular_permutations(5), Count::Exact(24));
        assert_eq!(circular_permutations(1), Count::ONE);
        assert_eq!(circular_permutations(0), Count::ZERO);
        // MISSISSIPPI: 11! / (1! 4! 4! 2!)
        assert_eq!(multiset_permutations(&[1, 4, 4, 2]), Count::Exact(34_650));
        assert_eq!(multiset_permutations(&[]), Count::ONE);
    }

    #[test]
    fn test_stirling_numbers() {
        let mut s1 = StirlingTable::new(StirlingKind::First);
        assert_eq!(s1.get(0, 0).unwrap(), Count::ONE);
        assert_eq!(s1.get(4, 0).unwrap(), Count::ZERO);
        assert_eq!(s1.get(4, 2).unwrap(), Count::Exact(11));
        assert_eq!(s1.get(5, 5).unwrap(), Count::ONE);
        assert_eq!(s1.get(3, 5).unwrap(), Count::ZERO);

        let mut s2 = StirlingTable::new(StirlingKind::Second);
        assert_eq!(s2.get(4, 2).unwrap(), Count::Exact(7));
        assert_eq!(s2.get(10, 3).unwrap(), Count::Exact(9330));
    }

    #[test]
    fn test_stirling_first_row_sums_to_factorial() {
        let mut s1 = StirlingTable::new(StirlingKind::First);
        for n in 0..15 {
            let sum = s1.row(n).unwrap().iter().fold(Count::ZERO, |a, &c| a.add(c));
            assert_eq!(sum, factorial(n as u64), "n={n}");
        }
    }

    #[test]
    fn test_stirling_table_is_memoized() {
        let mut s2 = StirlingTable::new(StirlingKind::Second);
        s2.get(30, 4).unwrap();
        assert_eq!(s2.rows_computed(), 31);
        s2.get(12, 3).unwrap();
        assert_eq!(s2.rows_computed(), 31);
        assert!(s2.get(MAX_STIRLING_N + 1, 1).is_err());
    }

    #[test]
    fn test_large_stirling_degrades_gracefully() {
        let mut s2 = StirlingTable::new(StirlingKind::Second);
        let c = s2.get(200, 100).unwrap();
        assert!(!c.is_exact());
        assert!(c.log10().is_finite());
    }

    #[test]
    fn test_generation_counts_match_closed_forms() {
        let items = ['a', 'b', 'c', 'd', 'e'];
        for r in 0..=items.len() {
            let arrangements = generate_arrangements(&items, r).unwrap();
            assert_eq!(
                Count::Exact(arrangements.len() as u128),
                permutations(5, r as u64)
            );
            let combos = generate_combinations(&items, r).unwrap();
            assert_eq!(
                Count::Exact(combos.len() as u128),
                combinations(5, r as u64)
            );
        }
        assert_eq!(generate_permutations(&items).unwrap().len(), 120);
    }

    #[test]
    fn test_generation_content() {
        let combos = generate_combinations(&[1, 2, 3], 2).unwrap();
        assert_eq!(combos, vec![vec![1, 2], vec![1, 3], vec![2, 3]]);
        let perms = generate_permutations(&["x", "y"]).unwrap();
        assert_eq!(perms, vec![vec!["x", "y"], vec!["y", "x"]]);
    }

    #[test]
    fn test_generation_cap() {
        let items = [1, 2, 3, 4, 5, 6];
        let err = generate_permutations(&items).unwrap_err();
        assert_eq!(err.field, "items");
        assert!(generate_combinations(&items, 2).is_err());
        assert!(generate_combinations(&[1, 2], 3).is_err());
    }
}
