//! Loan amortization, mortgages and rental property returns.

use std::fmt;
use std::str::FromStr;

use crate::error::{CalcError, ParseError, ValidationError, ensure_finite};
use crate::format::{format_compact, format_currency};
use crate::model::{Outputs, Table};
use crate::validate::{Rule, Validator, rules};

use super::{Calculation, Inputs};

const TERM_YEARS: &[Rule] = &[Rule::NonNegative, Rule::AtMost(100.0)];

/// Payment for a fully amortizing loan.
///
/// `P·i·(1+i)^n / ((1+i)^n − 1)`, with `P/n` at a zero rate and 0 when there
/// are no periods.
pub fn monthly_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }
    let growth = (1.0 + monthly_rate).powi(months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schedule {
    pub rows: Vec<AmortizationRow>,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl Schedule {
    pub fn months(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(&["month", "payment", "principal", "interest", "balance"]);
        for row in &self.rows {
            table.push(vec![
                row.month.to_string(),
                format!("{:.2}", row.payment),
                format!("{:.2}", row.principal),
                format!("{:.2}", row.interest),
                format!("{:.2}", row.balance),
            ]);
        }
        table
    }
}

/// Month-by-month schedule.
///
/// The balance never goes below zero; the final scheduled month retires
/// whatever rounding left over, and extra payments may end the loan early.
pub fn amortize(principal: f64, monthly_rate: f64, months: u32, extra: f64) -> Schedule {
    let payment = monthly_payment(principal, monthly_rate, months);
    let mut schedule = Schedule::default();
    let mut balance = principal;

    for month in 1..=months {
        if balance <= 0.0 {
            break;
        }
        let interest = balance * monthly_rate;
        let mut toward_principal = (payment + extra - interest).min(balance);
        if month == months {
            toward_principal = balance;
        }
        balance = (balance - toward_principal).max(0.0);

        schedule.total_interest += interest;
        schedule.total_paid += toward_principal + interest;
        schedule.rows.push(AmortizationRow {
            month,
            payment: toward_principal + interest,
            principal: toward_principal,
            interest,
            balance,
        });
    }
    schedule
}

/// Fixed-rate installment loan with optional extra monthly principal
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub principal: f64,
    /// Annual rate in percent
    pub annual_rate: f64,
    pub term_years: f64,
    pub extra_payment: f64,
}

impl Loan {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            principal: inputs.number("principal")?,
            annual_rate: inputs.number("annual_rate")?,
            term_years: inputs.number("term_years")?,
            extra_payment: inputs.number_or("extra_payment", 0.0)?,
        })
    }

    fn monthly_rate(&self) -> f64 {
        self.annual_rate / 100.0 / 12.0
    }

    fn months(&self) -> u32 {
        (self.term_years * 12.0).round() as u32
    }

    fn whole_months(&self) -> bool {
        let months = self.term_years * 12.0;
        (months - months.round()).abs() < 1e-9
    }
}

impl Calculation for Loan {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("principal", self.principal, rules::POSITIVE)
            .field("annual_rate", self.annual_rate, rules::PERCENT)
            .field("term_years", self.term_years, TERM_YEARS)
            .field("extra_payment", self.extra_payment, rules::NON_NEGATIVE)
            .cross(
                "term_years",
                self.whole_months(),
                "must be a whole number of months",
            )
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let i = self.monthly_rate();
        let n = self.months();
        let mut outputs = Outputs::new().step(format!(
            "i = {}% / 12 = {}, n = {} × 12 = {n}",
            format_compact(self.annual_rate),
            format_compact(i),
            format_compact(self.term_years),
        ));

        if n == 0 {
            return Ok(outputs
                .number("monthly_payment", 0.0)
                .number("total_interest", 0.0)
                .number("total_paid", 0.0)
                .number("months", 0.0)
                .number("remaining_balance", self.principal)
                .step("no payment periods: the whole principal stays outstanding"));
        }

        let payment = ensure_finite("monthly payment", monthly_payment(self.principal, i, n))?;
        outputs = if i == 0.0 {
            outputs.step(format!("payment = P / n = {}", format_currency(payment)))
        } else {
            outputs
                .step("payment = P·i·(1+i)^n / ((1+i)^n − 1)")
                .step(format!("payment = {}", format_currency(payment)))
        };

        let schedule = amortize(self.principal, i, n, self.extra_payment);
        outputs = outputs
            .number("monthly_payment", payment)
            .number("total_interest", schedule.total_interest)
            .number("total_paid", schedule.total_paid)
            .number("months", schedule.months() as f64)
            .step(format!(
                "total interest {} over {} months",
                format_currency(schedule.total_interest),
                schedule.months()
            ));

        if self.extra_payment > 0.0 {
            let baseline = amortize(self.principal, i, n, 0.0);
            outputs = outputs
                .number(
                    "interest_saved",
                    baseline.total_interest - schedule.total_interest,
                )
                .number(
                    "months_saved",
                    baseline.months().saturating_sub(schedule.months()) as f64,
                )
                .step(format!(
                    "extra {} per month retires the loan in {} months",
                    format_currency(self.extra_payment),
                    schedule.months()
                ));
        }
        Ok(outputs.table(schedule.to_table()))
    }

    fn describe(&self) -> String {
        format!(
            "{} at {}% for {} years",
            format_currency(self.principal),
            format_compact(self.annual_rate),
            format_compact(self.term_years)
        )
    }
}

/// Mortgage program; determines the down payment rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoanKind {
    #[default]
    Conventional,
    Fha,
    Va,
}

impl LoanKind {
    pub const CHOICES: &'static str = "conventional, fha, va";
}

impl FromStr for LoanKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conventional" => Ok(LoanKind::Conventional),
            "fha" => Ok(LoanKind::Fha),
            "va" => Ok(LoanKind::Va),
            other => Err(ParseError::UnknownChoice {
                field: "loan_kind".into(),
                value: other.to_string(),
                expected: Self::CHOICES,
            }),
        }
    }
}

impl fmt::Display for LoanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoanKind::Conventional => "conventional",
            LoanKind::Fha => "FHA",
            LoanKind::Va => "VA",
        })
    }
}

/// Minimum FHA down payment, percent
const FHA_MIN_DOWN_PCT: f64 = 3.5;

/// Home purchase financed by a loan
#[derive(Debug, Clone, PartialEq)]
pub struct Mortgage {
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub annual_rate: f64,
    pub term_years: f64,
    pub loan_kind: LoanKind,
    pub extra_payment: f64,
}

impl Mortgage {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            home_price: inputs.number("home_price")?,
            down_payment_pct: inputs.number("down_payment_pct")?,
            annual_rate: inputs.number("annual_rate")?,
            term_years: inputs.number("term_years")?,
            loan_kind: inputs.choice("loan_kind")?.unwrap_or_default(),
            extra_payment: inputs.number_or("extra_payment", 0.0)?,
        })
    }

    fn down_payment(&self) -> f64 {
        self.home_price * self.down_payment_pct / 100.0
    }

    fn loan(&self) -> Loan {
        Loan {
            principal: self.home_price - self.down_payment(),
            annual_rate: self.annual_rate,
            term_years: self.term_years,
            extra_payment: self.extra_payment,
        }
    }
}

impl Calculation for Mortgage {
    fn validate(&self) -> Result<(), ValidationError> {
        let pct = self.down_payment_pct;
        Validator::new()
            .field("home_price", self.home_price, rules::POSITIVE)
            .field("down_payment_pct", pct, rules::PERCENT)
            .field("annual_rate", self.annual_rate, rules::PERCENT)
            .field("term_years", self.term_years, TERM_YEARS)
            .field("extra_payment", self.extra_payment, rules::NON_NEGATIVE)
            .cross(
                "down_payment_pct",
                self.loan_kind != LoanKind::Va || pct == 0.0,
                "must be 0 for a VA loan",
            )
            .cross(
                "down_payment_pct",
                self.loan_kind != LoanKind::Fha || pct >= FHA_MIN_DOWN_PCT,
                &format!("must be at least {FHA_MIN_DOWN_PCT} for an FHA loan"),
            )
            .cross("down_payment_pct", pct < 100.0, "must be less than 100")
            .finish()?;
        self.loan().validate()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let loan = self.loan();
        let outputs = Outputs::new()
            .number("down_payment", self.down_payment())
            .number("loan_amount", loan.principal)
            .label("loan_kind", self.loan_kind.to_string())
            .step(format!(
                "loan = {} − {}% down = {}",
                format_currency(self.home_price),
                format_compact(self.down_payment_pct),
                format_currency(loan.principal)
            ));
        let amortized = loan.compute()?;
        Ok(merge(outputs, amortized))
    }

    fn describe(&self) -> String {
        format!(
            "{}-year {} mortgage on {}",
            format_compact(self.term_years),
            self.loan_kind,
            format_currency(self.home_price)
        )
    }
}

fn merge(mut into: Outputs, from: Outputs) -> Outputs {
    into.numbers.extend(from.numbers);
    into.exact.extend(from.exact);
    into.labels.extend(from.labels);
    into.derivation.extend(from.derivation);
    if from.table.is_some() {
        into.table = from.table;
    }
    into
}

/// Leveraged rental property: income, returns and debt coverage
#[derive(Debug, Clone, PartialEq)]
pub struct Rental {
    pub purchase_price: f64,
    pub down_payment_pct: f64,
    pub annual_rate: f64,
    pub term_years: f64,
    pub monthly_rent: f64,
    pub monthly_expenses: f64,
    pub vacancy_pct: f64,
}

impl Rental {
    pub(crate) fn parse(inputs: &Inputs) -> Result<Self, CalcError> {
        Ok(Self {
            purchase_price: inputs.number("purchase_price")?,
            down_payment_pct: inputs.number("down_payment_pct")?,
            annual_rate: inputs.number("annual_rate")?,
            term_years: inputs.number("term_years")?,
            monthly_rent: inputs.number("monthly_rent")?,
            monthly_expenses: inputs.number("monthly_expenses")?,
            vacancy_pct: inputs.number_or("vacancy_pct", 0.0)?,
        })
    }
}

impl Calculation for Rental {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .field("purchase_price", self.purchase_price, rules::POSITIVE)
            .field("down_payment_pct", self.down_payment_pct, rules::PERCENT)
            .field("annual_rate", self.annual_rate, rules::PERCENT)
            .field("term_years", self.term_years, TERM_YEARS)
            .field("monthly_rent", self.monthly_rent, rules::NON_NEGATIVE)
            .field("monthly_expenses", self.monthly_expenses, rules::NON_NEGATIVE)
            .field("vacancy_pct", self.vacancy_pct, rules::PERCENT)
            .finish()
    }

    fn compute(&self) -> Result<Outputs, CalcError> {
        let cash_invested = self.purchase_price * self.down_payment_pct / 100.0;
        let loan_amount = self.purchase_price - cash_invested;
        let months = (self.term_years * 12.0).round() as u32;
        let payment = if loan_amount > 0.0 {
            monthly_payment(loan_amount, self.annual_rate / 1200.0, months)
        } else {
            0.0
        };
        let debt_service = ensure_finite("annual debt service", payment * 12.0)?;

        let effective_rent = self.monthly_rent * (1.0 - self.vacancy_pct / 100.0);
        let noi = (effective_rent - self.monthly_expenses) * 12.0;
        let annual_cash_flow = noi - debt_service;

        let mut outputs = Outputs::new()
            .number("monthly_cash_flow", annual_cash_flow / 12.0)
            .number("annual_cash_flow", annual_cash_flow)
            .number("noi", noi)
            .number("cap_rate", noi / self.purchase_price * 100.0)
            .number("monthly_payment", payment)
            .step(format!(
                "NOI = ({} effective rent − {} expenses) × 12 = {}",
                format_currency(effective_rent),
                format_currency(self.monthly_expenses),
                format_currency(noi)
            ))
            .step(format!(
                "annual debt service = {} × 12 = {}",
                format_currency(payment),
                format_currency(debt_service)
            ));

        if cash_invested > 0.0 {
            outputs = outputs.number(
                "cash_on_cash",
                annual_cash_flow / cash_invested * 100.0,
            );
        }
        if debt_service > 0.0 {
            let dscr = noi / debt_service;
            outputs = outputs
                .number("dscr", dscr)
                .step(format!("DSCR = NOI / debt service = {}", format_compact(dscr)));
        } else {
            outputs = outputs.step("no debt service: DSCR not applicable");
        }
        Ok(outputs)
    }

    fn describe(&self) -> String {
        format!(
            "rental at {} renting for {}/month",
            format_currency(self.purchase_price),
            format_currency(self.monthly_rent)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(principal: f64, rate: f64, years: f64) -> Loan {
        Loan {
            principal,
            annual_rate: rate,
            term_years: years,
            extra_payment: 0.0,
        }
    }

    #[test]
    fn test_monthly_payment() {
        let p = monthly_payment(50_000.0, 0.03 / 12.0, 60);
        assert!((p - 898.434_533_203_174).abs() < 1e-6);
        assert_eq!(monthly_payment(12_000.0, 0.0, 12), 1000.0);
        assert_eq!(monthly_payment(12_000.0, 0.01, 0), 0.0);
    }

    #[test]
    fn test_schedule_retires_principal() {
        let schedule = amortize(50_000.0, 0.0025, 60, 0.0);
        assert_eq!(schedule.months(), 60);
        let principal_paid: f64 = schedule.rows.iter().map(|r| r.principal).sum();
        assert!((principal_paid - 50_000.0).abs() < 0.01 * 60.0);
        assert_eq!(schedule.rows.last().unwrap().balance, 0.0);
        assert!(schedule.rows.iter().all(|r| r.balance >= 0.0));
    }

    #[test]
    fn test_extra_payment_ends_early() {
        let mut l = loan(50_000.0, 3.0, 5.0);
        l.extra_payment = 500.0;
        l.validate().unwrap();
        let out = l.compute().unwrap();
        assert!(out.get("months").unwrap() < 60.0);
        assert!(out.get("interest_saved").unwrap() > 0.0);
        assert!((out.get("monthly_payment").unwrap() - 898.43).abs() < 0.01);
    }

    #[test]
    fn test_zero_term_and_zero_rate() {
        let out = loan(10_000.0, 5.0, 0.0).compute().unwrap();
        assert_eq!(out.get("monthly_payment"), Some(0.0));
        assert_eq!(out.get("remaining_balance"), Some(10_000.0));

        let out = loan(12_000.0, 0.0, 1.0).compute().unwrap();
        assert_eq!(out.get("monthly_payment"), Some(1000.0));
        assert_eq!(out.get("total_interest"), Some(0.0));
    }

    #[test]
    fn test_loan_validation() {
        assert_eq!(loan(0.0, 3.0, 5.0).validate().unwrap_err().field, "principal");
        assert_eq!(loan(1000.0, 101.0, 5.0).validate().unwrap_err().field, "annual_rate");
        let err = loan(1000.0, 3.0, 1.01).validate().unwrap_err();
        assert_eq!(err.message, "must be a whole number of months");
    }

    fn mortgage(kind: LoanKind, down: f64) -> Mortgage {
        Mortgage {
            home_price: 300_000.0,
            down_payment_pct: down,
            annual_rate: 6.0,
            term_years: 30.0,
            loan_kind: kind,
            extra_payment: 0.0,
        }
    }

    #[test]
    fn test_mortgage_down_payment_rules() {
        let err = mortgage(LoanKind::Va, 5.0).validate().unwrap_err();
        assert_eq!(err.field, "down_payment_pct");
        assert_eq!(err.message, "must be 0 for a VA loan");
        assert!(mortgage(LoanKind::Va, 0.0).validate().is_ok());

        let err = mortgage(LoanKind::Fha, 3.0).validate().unwrap_err();
        assert_eq!(err.message, "must be at least 3.5 for an FHA loan");
        assert!(mortgage(LoanKind::Fha, 3.5).validate().is_ok());
        assert!(mortgage(LoanKind::Conventional, 100.0).validate().is_err());
    }

    #[test]
    fn test_mortgage_outputs() {
        let out = mortgage(LoanKind::Conventional, 20.0).compute().unwrap();
        assert_eq!(out.get("down_payment"), Some(60_000.0));
        assert_eq!(out.get("loan_amount"), Some(240_000.0));
        // 240k at 6% for 30 years
        assert!((out.get("monthly_payment").unwrap() - 1438.92).abs() < 0.01);
        assert_eq!(out.table.as_ref().map(Table::len), Some(360));
    }

    #[test]
    fn test_loan_kind_from_str() {
        assert_eq!("FHA".parse::<LoanKind>(), Ok(LoanKind::Fha));
        assert!("jumbo".parse::<LoanKind>().is_err());
    }

    #[test]
    fn test_rental_metrics() {
        let rental = Rental {
            purchase_price: 200_000.0,
            down_payment_pct: 25.0,
            annual_rate: 0.0,
            term_years: 30.0,
            monthly_rent: 2_000.0,
            monthly_expenses: 500.0,
            vacancy_pct: 5.0,
        };
        rental.validate().unwrap();
        let out = rental.compute().unwrap();
        // (1900 − 500) × 12
        assert!((out.get("noi").unwrap() - 16_800.0).abs() < 1e-9);
        assert!((out.get("cap_rate").unwrap() - 8.4).abs() < 1e-9);
        // 150k over 360 months at 0% = 416.67/month
        assert!((out.get("monthly_payment").unwrap() - 416.666_666).abs() < 1e-3);
        // 16 800 / 5 000
        assert!((out.get("dscr").unwrap() - 3.36).abs() < 1e-9);
        // (16 800 − 5 000) / 50 000
        assert!((out.get("cash_on_cash").unwrap() - 23.6).abs() < 1e-9);
    }

    #[test]
    fn test_rental_without_debt_has_no_dscr() {
        let rental = Rental {
            purchase_price: 100_000.0,
            down_payment_pct: 100.0,
            annual_rate: 5.0,
            term_years: 30.0,
            monthly_rent: 1_000.0,
            monthly_expenses: 200.0,
            vacancy_pct: 0.0,
        };
        let out = rental.compute().unwrap();
        assert_eq!(out.get("dscr"), None);
        assert!((out.get("cash_on_cash").unwrap() - 9.6).abs() < 1e-9);
    }
}
