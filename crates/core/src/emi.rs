//! Equated monthly installment calculation and loan term validation.
//!
//! The EMI is computed exactly once at submission and is immutable
//! afterwards; every view of an application shows the same figure.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::Money;

/// Months per year, for converting an annual rate to a monthly one.
const MONTHS_PER_YEAR: f64 = 12.0;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate requested terms against a product's limits.
///
/// Runs before the EMI computation and before any record is created.
pub fn validate_terms(
    max_amount: Money,
    max_tenure_months: i32,
    amount: Money,
    tenure_months: i32,
) -> CoreResult<()> {
    if amount <= 0 {
        return Err(CoreError::InvalidAmount(format!(
            "loan amount must be positive, got {amount}"
        )));
    }
    if amount > max_amount {
        return Err(CoreError::InvalidAmount(format!(
            "loan amount {amount} exceeds the product limit of {max_amount}"
        )));
    }
    if tenure_months <= 0 {
        return Err(CoreError::InvalidTenure(format!(
            "tenure must be positive, got {tenure_months} months"
        )));
    }
    if tenure_months > max_tenure_months {
        return Err(CoreError::InvalidTenure(format!(
            "tenure of {tenure_months} months exceeds the product limit of {max_tenure_months}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EMI computation
// ---------------------------------------------------------------------------

/// Compute the monthly installment for an amortizing loan.
///
/// `annual_rate_percent` is the nominal annual rate, e.g. `12.0` for 12%.
/// With a zero rate the installment is a plain division of the principal.
/// The result is rounded half-up to the whole currency unit.
pub fn compute_emi(
    principal: Money,
    annual_rate_percent: f64,
    tenure_months: i32,
) -> CoreResult<Money> {
    if principal <= 0 {
        return Err(CoreError::InvalidAmount(format!(
            "loan amount must be positive, got {principal}"
        )));
    }
    if tenure_months <= 0 {
        return Err(CoreError::InvalidTenure(format!(
            "tenure must be positive, got {tenure_months} months"
        )));
    }

    let monthly_rate = annual_rate_percent / MONTHS_PER_YEAR / 100.0;
    let installment = if monthly_rate == 0.0 {
        principal as f64 / tenure_months as f64
    } else {
        let growth = (1.0 + monthly_rate).powi(tenure_months);
        principal as f64 * monthly_rate * growth / (growth - 1.0)
    };

    // f64::round is half-away-from-zero, which is half-up for the positive
    // values reachable here.
    Ok(installment.round() as Money)
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Display-ready repayment figures for a prospective or submitted loan.
///
/// `total_payable` and `total_interest` are derived for display only and
/// are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmiQuote {
    pub monthly_installment: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

/// Compute the full repayment quote for the given terms.
pub fn quote(
    principal: Money,
    annual_rate_percent: f64,
    tenure_months: i32,
) -> CoreResult<EmiQuote> {
    let monthly_installment = compute_emi(principal, annual_rate_percent, tenure_months)?;
    let total_payable = monthly_installment * tenure_months as Money;
    Ok(EmiQuote {
        monthly_installment,
        total_payable,
        total_interest: total_payable - principal,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
