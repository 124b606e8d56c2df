//! Encoding of a [`RawRecord`] into the model's fixed input layout.
//!
//! The slot order below is the order the classifier was trained on. The
//! encoder is total: malformed or missing fields fall back to zero instead
//! of failing the request.

use super::record::{CreditMix, PaymentOfMinAmount, RawField, RawRecord};
use serde::Serialize;

pub const FEATURE_COUNT: usize = 15;

/// Upper bucket for count-like fields; anything above lands in `MAX_BIN + 1`.
pub const MAX_BIN: f64 = 10.0;

pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Credit_Mix_Good",
    "Credit_Mix_Standard",
    "Payment_of_Min_Amount_No",
    "Payment_of_Min_Amount_Yes",
    "Num_Bank_Accounts_Bin",
    "Num_Credit_Card_Bin",
    "Monthly_Inhand_Salary",
    "Delay_from_due_date",
    "Changed_Credit_Limit",
    "Outstanding_Debt",
    "Credit_History_Age",
    "Annual_Income_log",
    "Interest_Rate_log",
    "Num_Credit_Inquiries_log",
    "Total_EMI_per_month_log",
];

/// Model input row in training-time order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value of a named slot; unknown names read as `0.0`.
    pub fn get(&self, name: &str) -> f64 {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .and_then(|index| self.0.get(index).copied())
            .unwrap_or(0.0)
    }

    /// Single-precision row for the inference runtime.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|value| *value as f32).collect()
    }

    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// Encode a raw record into the 15 model features.
pub fn encode(record: &RawRecord) -> FeatureVector {
    let (mix_good, mix_standard) = match record.credit_mix() {
        CreditMix::Good => (1.0, 0.0),
        CreditMix::Standard => (0.0, 1.0),
        CreditMix::Bad | CreditMix::Unrecognized => (0.0, 0.0),
    };

    let (min_no, min_yes) = match record.payment_of_min_amount() {
        PaymentOfMinAmount::No => (1.0, 0.0),
        PaymentOfMinAmount::Yes => (0.0, 1.0),
        PaymentOfMinAmount::NotMentioned | PaymentOfMinAmount::Unrecognized => (0.0, 0.0),
    };

    FeatureVector([
        mix_good,
        mix_standard,
        min_no,
        min_yes,
        bin(&record.num_bank_accounts, MAX_BIN),
        bin(&record.num_credit_card, MAX_BIN),
        record.monthly_inhand_salary.number_or_zero(),
        record.delay_from_due_date.number_or_zero(),
        record.changed_credit_limit.number_or_zero(),
        record.outstanding_debt.number_or_zero(),
        credit_history_months(&record.credit_history_age),
        log_or_zero(record.annual_income.number_or_zero()),
        log_or_zero(record.interest_rate.number_or_zero()),
        log_or_zero(record.num_credit_inquiries.number_or_zero()),
        log_or_zero(record.total_emi_per_month.number_or_zero()),
    ])
}

/// Bucket a count into `0..=max_bin`, with `max_bin + 1` as overflow and
/// `0` for anything unparseable or non-positive.
pub fn bin(field: &RawField, max_bin: f64) -> f64 {
    match field.leading_number() {
        Some(value) if value > max_bin => max_bin + 1.0,
        Some(value) if value > 0.0 => value.floor(),
        _ => 0.0,
    }
}

/// Natural log for positive values, zero otherwise. Not `ln(1 + x)`.
pub fn log_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        value.ln()
    } else {
        0.0
    }
}

/// Total months from text such as `"31 Years and 6 Months"`.
pub fn credit_history_months(field: &RawField) -> f64 {
    match field {
        RawField::Number(months) if months.is_finite() => *months,
        RawField::Text(text) => {
            let years = count_before(text, "year").unwrap_or(0.0);
            let months = count_before(text, "month").unwrap_or(0.0);
            years * 12.0 + months
        }
        RawField::Number(_) | RawField::Flag(_) | RawField::Missing => 0.0,
    }
}

/// First digit run followed (after optional whitespace) by `unit`,
/// compared case-insensitively.
fn count_before(text: &str, unit: &str) -> Option<f64> {
    let lowered = text.to_ascii_lowercase();
    let bytes = lowered.as_bytes();

    for (unit_start, _) in lowered.match_indices(unit) {
        let mut digits_end = unit_start;
        while digits_end > 0 && bytes[digits_end - 1].is_ascii_whitespace() {
            digits_end -= 1;
        }
        let mut digits_start = digits_end;
        while digits_start > 0 && bytes[digits_start - 1].is_ascii_digit() {
            digits_start -= 1;
        }
        if digits_start < digits_end {
            return lowered.get(digits_start..digits_end)?.parse::<f64>().ok();
        }
    }

    None
}
