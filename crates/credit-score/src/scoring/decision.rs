use serde::Serialize;
use std::fmt;

/// Probability of `Poor` at or above which the verdict is `Poor` regardless
/// of the other classes. Fixed at model tuning time.
pub const POOR_THRESHOLD: f64 = 0.38059428;

pub const CLASS_COUNT: usize = 3;

/// Model classes in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CreditClass {
    Good,
    Poor,
    Standard,
}

impl CreditClass {
    pub const ALL: [CreditClass; CLASS_COUNT] =
        [CreditClass::Good, CreditClass::Poor, CreditClass::Standard];

    pub fn index(self) -> u8 {
        match self {
            CreditClass::Good => 0,
            CreditClass::Poor => 1,
            CreditClass::Standard => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CreditClass::Good => "Good",
            CreditClass::Poor => "Poor",
            CreditClass::Standard => "Standard",
        }
    }
}

impl fmt::Display for CreditClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized class distribution, keyed by class name on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities {
    #[serde(rename = "Good")]
    pub good: f64,
    #[serde(rename = "Poor")]
    pub poor: f64,
    #[serde(rename = "Standard")]
    pub standard: f64,
}

impl Probabilities {
    pub fn of(&self, class: CreditClass) -> f64 {
        match class {
            CreditClass::Good => self.good,
            CreditClass::Poor => self.poor,
            CreditClass::Standard => self.standard,
        }
    }

    pub fn to_array(&self) -> [f64; CLASS_COUNT] {
        [self.good, self.poor, self.standard]
    }
}

/// Verdict for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: CreditClass,
    pub class_index: u8,
    pub probabilities: Probabilities,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecisionError {
    #[error("expected 3 class scores, model returned {0}")]
    WrongArity(usize),
    #[error("class score {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f64; CLASS_COUNT]) -> [f64; CLASS_COUNT] {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps = scores.map(|score| (score - max).exp());
    let sum: f64 = exps.iter().sum();
    exps.map(|value| value / sum)
}

/// Risk-first rule: `Poor` wins once it clears [`POOR_THRESHOLD`], otherwise
/// the larger of `Good` and `Standard`, with `Good` taking ties.
pub fn classify(probabilities: &Probabilities) -> CreditClass {
    if probabilities.poor >= POOR_THRESHOLD {
        return CreditClass::Poor;
    }

    if probabilities.standard > probabilities.good {
        CreditClass::Standard
    } else {
        CreditClass::Good
    }
}

/// Turn raw model scores into a verdict.
pub fn decide(raw_scores: &[f32]) -> Result<PredictionResult, DecisionError> {
    let scores: [f64; CLASS_COUNT] = match raw_scores {
        [good, poor, standard] => [f64::from(*good), f64::from(*poor), f64::from(*standard)],
        other => return Err(DecisionError::WrongArity(other.len())),
    };

    if let Some((index, value)) = scores
        .iter()
        .enumerate()
        .find(|(_, value)| !value.is_finite())
    {
        return Err(DecisionError::NonFinite {
            index,
            value: *value,
        });
    }

    let [good, poor, standard] = softmax(&scores);
    let probabilities = Probabilities {
        good,
        poor,
        standard,
    };
    let label = classify(&probabilities);

    Ok(PredictionResult {
        label,
        class_index: label.index(),
        probabilities,
    })
}
