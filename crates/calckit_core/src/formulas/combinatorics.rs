//! Counting formulas built on [`crate::combinatorics`].

use crate::combinatorics::{
    self as counting, Count, MAX_ENUMERATION_ITEMS, MAX_STIRLING_N, StirlingKind, StirlingTable,
};
use crate::error::{CalcError, ValidationError};
use crate::model::{Outputs, Table};
use crate::validate::{Rule, Validator, rules};

use super::{Calculation, FormulaId, Inputs};

const MAX_COUNT_N: f64 = counting::MAX_COUNT_N as f64;

const COUNT_BOUNDED: &[Rule] = &[Rule::NonNegative, Rule::Integer, Rule::AtMost(MAX_COUNT_N)];

fn with_count(outputs: Outputs, count: Count) -> Outputs {
    let approx = count.as_f64();
    if approx.is_finite() {
        outputs.exact("count", approx, count.to_string())
    } else {
        outputs
            .label("count", count.to_string())
            .number("log10_count", count.log10())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Permutation,
    Combination,
    PermutationWithRepetition,
    CombinationWithRepetition,
}

impl SelectionKind {
    pub fn id(self) -> FormulaId {
        match self {
            SelectionKind::Permutation => FormulaId::Permutation,
            SelectionKind::Combination => FormulaId::Combination,
            SelectionKind::PermutationWithRepetition => FormulaId::PermutationRepetition,
            SelectionKind::CombinationWithRepetition => FormulaId::CombinationRepetition,
        }
    }

    fn repeats(self) -> bool {
        matches!(
            self,
            SelectionKind::PermutationWithRepetition | SelectionKind::CombinationWithRepetition
        )
    }
}

/// Choosing r of n items, ordered or not, with or without repetition
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub kind: SelectionKind,
    pub n: f64,
    pub r: f64,
    /// Named items to enumerate explicitly
    pub items: Option<Vec<String>>,
}

impl Selection {
    pub(crate) fn parse(kind: SelectionKind, inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            kind,
            n: inputs.number("n")?,
            r: inputs.number("r")?,
            items: if kind.repeats() {
                None
            } else {
                inputs.items("items")
            },
        })
    }

    fn count(&self) -> Count {
        let (n, r) = (self.n as u64, self.r as u64);
        match self.kind {
            SelectionKind::Permutation => counting::permutations(n, r),
            SelectionKind::Combination => counting::combinations(n, r),
            SelectionKind::PermutationWithRepetition => counting::permutations_with_repetition(n, r),
            SelectionKind::CombinationWithRepetition => counting::combinations_with_repetition(n, r),
        }
    }

    fn formula_line(&self) -> &'static str {
        match self.kind {
            SelectionKind::Permutation => "P(n, r) = n! / (n − r)!",
            SelectionKind::Combination => "C(n, r) = n! / (r! (n − r)!)",
            SelectionKind::PermutationWithRepetition => "n^r ordered selections with repetition",
            SelectionKind::CombinationWithRepetition => "C(n + r − 1, r)",
        }
    }
}

impl Calculation for Selection {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new()
            .field("n", self.n, COUNT_BOUNDED)
            .field("r", self.r, COUNT_BOUNDED);
        if !self.kind.repeats() {
            v = v.cross("r", self.r <= self.n, "must not exceed n");
        }
        if let Some(items) = &self.items {
            v = v
                .cross(
                    "items",
                    items.len() <= MAX_ENUMERATION_ITEMS,
                    &format!("at most {MAX_ENUMERATION_ITEMS} items can be enumerated"),
                )
                .cross(
                    "n",
                    items.len() as f64 == self.n,
                    "must equal the number of items",
                );
        }
        v.finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let count = self.count();
        let mut outputs = Outputs::new()
            .step(self.formula_line())
            .step(format!("{} = {count}", self.describe()));

        if let Some(items) = &self.items {
            let r = self.r as usize;
            let listed = match self.kind {
                SelectionKind::Permutation => counting::generate_arrangements(items, r)?,
                _ => counting::generate_combinations(items, r)?,
            };
            let mut table = Table::new(&["#", "selection"]);
            for (i, pick) in listed.iter().enumerate() {
                table.push(vec![(i + 1).to_string(), pick.join(" ")]);
            }
            outputs = outputs
                .step(format!("enumerated {} selections", table.len()))
                .table(table);
        }
        Ok(with_count(outputs, count))
    }

    fn describe(&self) -> String {
        let (n, r) = (self.n, self.r);
        match self.kind {
            SelectionKind::Permutation => format!("P({n}, {r})"),
            SelectionKind::Combination => format!("C({n}, {r})"),
            SelectionKind::PermutationWithRepetition => format!("{n}^{r}"),
            SelectionKind::CombinationWithRepetition => format!("C({n} + {r} − 1, {r})"),
        }
    }
}

/// Arrangements of n distinct items around a circle
#[derive(Debug, Clone, PartialEq)]
pub struct Circular {
    pub n: f64,
}

impl Circular {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            n: inputs.number("n")?,
        })
    }
}

impl Calculation for Circular {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("n", self.n, rules::POSITIVE_COUNT)
            .field("n", self.n, &[Rule::AtMost(MAX_COUNT_N)])
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let count = counting::circular_permutations(self.n as u64);
        let outputs = Outputs::new()
            .step("(n − 1)! arrangements, rotations identified")
            .step(format!("{} = {count}", self.describe()));
        Ok(with_count(outputs, count))
    }

    fn describe(&self) -> String {
        format!("({} − 1)!", self.n)
    }
}

/// Distinct orderings of a multiset with the given multiplicities
#[derive(Debug, Clone, PartialEq)]
pub struct Multiset {
    pub frequencies: Vec<f64>,
}

impl Multiset {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            frequencies: inputs.numbers("frequencies")?,
        })
    }
}

impl Calculation for Multiset {
    fn validate(&self) -> Result<(), ValidationError> {
        let total: f64 = self.frequencies.iter().sum();
        let mut v = Validator::new().cross(
            "frequencies",
            !self.frequencies.is_empty(),
            "at least one frequency is required",
        );
        for (i, &f) in self.frequencies.iter().enumerate() {
            v = v.field(&format!("frequencies[{}]", i + 1), f, rules::COUNT);
        }
        v.cross(
            "frequencies",
            total <= MAX_COUNT_N,
            &format!("total must be at most {MAX_COUNT_N}"),
        )
        .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let freqs: Vec<u64> = self.frequencies.iter().map(|&f| f as u64).collect();
        let total: u64 = freqs.iter().sum();
        let count = counting::multiset_permutations(&freqs);
        let outputs = Outputs::new()
            .number("total_items", total as f64)
            .step("(Σfᵢ)! / Π(fᵢ!)")
            .step(format!("{} = {count}", self.describe()));
        Ok(with_count(outputs, count))
    }

    fn describe(&self) -> String {
        let total: f64 = self.frequencies.iter().sum();
        let denominators: Vec<String> = self.frequencies.iter().map(|f| format!("{f}!")).collect();
        format!("{total}! / ({})", denominators.join(" · "))
    }
}

/// Stirling number of the first (unsigned) or second kind
#[derive(Debug, Clone, PartialEq)]
pub struct Stirling {
    pub kind: StirlingKind,
    pub n: f64,
    pub k: f64,
}

impl Stirling {
    pub(crate) fn parse(kind: StirlingKind, inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            kind,
            n: inputs.number("n")?,
            k: inputs.number("k")?,
        })
    }

    pub fn id(&self) -> FormulaId {
        match self.kind {
            StirlingKind::First => FormulaId::StirlingFirst,
            StirlingKind::Second => FormulaId::StirlingSecond,
        }
    }
}

impl Calculation for Stirling {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("n", self.n, rules::COUNT)
            .field("n", self.n, &[Rule::AtMost(MAX_STIRLING_N as f64)])
            .field("k", self.k, rules::COUNT)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let mut table = StirlingTable::new(self.kind);
        let count = table.get(self.n as usize, self.k as usize)?;
        let recurrence = match self.kind {
            StirlingKind::First => "c(n, k) = c(n−1, k−1) + (n−1)·c(n−1, k)",
            StirlingKind::Second => "S(n, k) = k·S(n−1, k) + S(n−1, k−1)",
        };
        let outputs = Outputs::new()
            .step(recurrence)
            .step(format!("{} = {count}", self.describe()));
        Ok(with_count(outputs, count))
    }

    fn describe(&self) -> String {
        match self.kind {
            StirlingKind::First => format!("c({}, {})", self.n, self.k),
            StirlingKind::Second => format!("S({}, {})", self.n, self.k),
        }
    }
}

/// Number of partitions of an n-element set
#[derive(Debug, Clone, PartialEq)]
pub struct Bell {
    pub n: f64,
}

impl Bell {
    /// Row breakdown is tabulated up to this n
    const TABLE_LIMIT: usize = 12;

    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            n: inputs.number("n")?,
        })
    }
}

impl Calculation for Bell {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("n", self.n, rules::COUNT)
            .field("n", self.n, &[Rule::AtMost(MAX_STIRLING_N as f64)])
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let n = self.n as usize;
        let mut stirling = StirlingTable::new(StirlingKind::Second);
        let count = counting::bell(&mut stirling, n)?;
        let mut outputs = Outputs::new()
            .step("B(n) = Σₖ S(n, k)")
            .step(format!("{} = {count}", self.describe()));
        if n <= Self::TABLE_LIMIT {
            let mut table = Table::new(&["k", "S(n, k)"]);
            for (k, c) in stirling.row(n)?.iter().enumerate() {
                table.push(vec![k.to_string(), c.to_string()]);
            }
            outputs = outputs.table(table);
        }
        Ok(with_count(outputs, count))
    }

    fn describe(&self) -> String {
        format!("B({})", self.n)
    }
}
