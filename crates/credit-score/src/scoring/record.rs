use serde::Deserialize;
use serde_json::Value;

/// A single human-entered field as it arrived on the wire.
///
/// The form posts numbers, numeric strings, or nothing at all depending on
/// the browser and the field; the encoder decides the defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub enum RawField {
    Number(f64),
    Text(String),
    Flag(bool),
    #[default]
    Missing,
}

impl From<Value> for RawField {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(number) => number.as_f64().map_or(Self::Missing, Self::Number),
            Value::String(text) => Self::Text(text),
            Value::Bool(flag) => Self::Flag(flag),
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Missing,
        }
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl RawField {
    /// Whole-value numeric coercion. Blank text is zero, anything that does
    /// not parse completely is `None`.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawField::Number(value) => *value,
            RawField::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().ok()?
                }
            }
            RawField::Flag(flag) => f64::from(u8::from(*flag)),
            RawField::Missing => 0.0,
        };
        value.is_finite().then_some(value)
    }

    /// Numeric coercion with every failure mapped to zero.
    pub fn number_or_zero(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }

    /// Prefix numeric coercion: `"4 accounts"` reads as 4. Only numbers and
    /// text can yield a value, which may be infinite (`"Infinity"`, `"1e999"`).
    pub fn leading_number(&self) -> Option<f64> {
        match self {
            RawField::Number(value) => (!value.is_nan()).then_some(*value),
            RawField::Text(text) => leading_float(text),
            RawField::Flag(_) | RawField::Missing => None,
        }
    }

    /// Trimmed text view; numbers are rendered, flags and missing are empty.
    pub fn text(&self) -> String {
        match self {
            RawField::Text(text) => text.trim().to_string(),
            RawField::Number(value) => value.to_string(),
            RawField::Flag(flag) => flag.to_string(),
            RawField::Missing => String::new(),
        }
    }
}

fn leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if trimmed[end..].starts_with("Infinity") {
        let sign = if bytes.first() == Some(&b'-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed.get(..end)?.parse::<f64>().ok()
}

/// Applicant attributes as posted by the prediction form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Annual_Income", default)]
    pub annual_income: RawField,
    #[serde(rename = "Monthly_Inhand_Salary", default)]
    pub monthly_inhand_salary: RawField,
    #[serde(rename = "Total_EMI_per_month", default)]
    pub total_emi_per_month: RawField,
    #[serde(rename = "Interest_Rate", default)]
    pub interest_rate: RawField,
    #[serde(rename = "Changed_Credit_Limit", default)]
    pub changed_credit_limit: RawField,
    #[serde(rename = "Outstanding_Debt", default)]
    pub outstanding_debt: RawField,
    #[serde(rename = "Num_Bank_Accounts", default)]
    pub num_bank_accounts: RawField,
    #[serde(rename = "Num_Credit_Card", default)]
    pub num_credit_card: RawField,
    #[serde(rename = "Num_Credit_Inquiries", default)]
    pub num_credit_inquiries: RawField,
    #[serde(rename = "Delay_from_due_date", default)]
    pub delay_from_due_date: RawField,
    #[serde(rename = "Credit_History_Age", default)]
    pub credit_history_age: RawField,
    #[serde(rename = "Credit_Mix", default)]
    pub credit_mix: RawField,
    #[serde(rename = "Payment_of_Min_Amount", default)]
    pub payment_of_min_amount: RawField,
}

impl RawRecord {
    pub fn credit_mix(&self) -> CreditMix {
        CreditMix::parse(&self.credit_mix.text())
    }

    pub fn payment_of_min_amount(&self) -> PaymentOfMinAmount {
        PaymentOfMinAmount::parse(&self.payment_of_min_amount.text())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditMix {
    Good,
    Standard,
    Bad,
    Unrecognized,
}

impl CreditMix {
    /// Matching is exact after trimming; casing is significant.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Good" => Self::Good,
            "Standard" => Self::Standard,
            "Bad" => Self::Bad,
            _ => Self::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOfMinAmount {
    Yes,
    No,
    NotMentioned,
    Unrecognized,
}

impl PaymentOfMinAmount {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Yes" => Self::Yes,
            "No" => Self::No,
            "NM" | "NotMentioned" => Self::NotMentioned,
            _ => Self::Unrecognized,
        }
    }
}
