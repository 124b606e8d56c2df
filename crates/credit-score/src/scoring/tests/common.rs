use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use serde_json::{json, Value};

use crate::scoring::{
    CreditScoreService, FeatureVector, LazyModel, ModelError, ModelLoader, ModelOutput, RawRecord,
    ScoringModel,
};

/// Form values for a long-standing customer with a standard credit mix.
pub(super) fn reference_payload() -> Value {
    json!({
        "Annual_Income": 39628.99,
        "Monthly_Inhand_Salary": 3359.41,
        "Total_EMI_per_month": 35.1,
        "Interest_Rate": 7,
        "Num_Bank_Accounts": 4,
        "Num_Credit_Card": 6,
        "Num_Credit_Inquiries": 3,
        "Delay_from_due_date": 23,
        "Changed_Credit_Limit": 11.5,
        "Outstanding_Debt": 502.38,
        "Credit_History_Age": "31 Years and 6 Months",
        "Credit_Mix": "Standard",
        "Payment_of_Min_Amount": "No"
    })
}

pub(super) fn reference_record() -> RawRecord {
    serde_json::from_value(reference_payload()).expect("reference record deserializes")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Model returning canned outputs and remembering the last row it saw.
pub(super) struct StubModel {
    outputs: Result<Vec<ModelOutput>, ModelError>,
    last_row: std::sync::Mutex<Option<FeatureVector>>,
}

impl StubModel {
    pub(super) fn returning(outputs: Vec<ModelOutput>) -> Self {
        Self {
            outputs: Ok(outputs),
            last_row: std::sync::Mutex::new(None),
        }
    }

    pub(super) fn failing(error: ModelError) -> Self {
        Self {
            outputs: Err(error),
            last_row: std::sync::Mutex::new(None),
        }
    }

    pub(super) fn last_row(&self) -> Option<FeatureVector> {
        *self.last_row.lock().expect("stub mutex poisoned")
    }
}

impl ScoringModel for StubModel {
    fn score(&self, features: &FeatureVector) -> Result<Vec<ModelOutput>, ModelError> {
        *self.last_row.lock().expect("stub mutex poisoned") = Some(*features);
        self.outputs.clone()
    }
}

/// Label column followed by logits, the usual shape of a converted classifier.
pub(super) fn classifier_outputs(logits: [f32; 3]) -> Vec<ModelOutput> {
    vec![
        ModelOutput::opaque("label"),
        ModelOutput::scores("probabilities", logits.to_vec()),
    ]
}

/// Loader handing out a shared stub, counting how often it ran and the most
/// loads it ever saw running at once.
pub(super) struct StubLoader {
    pub(super) calls: Arc<AtomicUsize>,
    pub(super) peak_running: Arc<AtomicUsize>,
    running: Arc<AtomicUsize>,
    model: Arc<StubModel>,
    delay: Duration,
    fail_first: usize,
}

impl StubLoader {
    pub(super) fn new(model: StubModel) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            peak_running: Arc::new(AtomicUsize::new(0)),
            running: Arc::new(AtomicUsize::new(0)),
            model: Arc::new(model),
            delay: Duration::ZERO,
            fail_first: 0,
        }
    }

    pub(super) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(super) fn failing_first(mut self, attempts: usize) -> Self {
        self.fail_first = attempts;
        self
    }

    pub(super) fn model(&self) -> Arc<StubModel> {
        Arc::clone(&self.model)
    }
}

impl ModelLoader for StubLoader {
    type Model = Arc<StubModel>;

    fn load(&self) -> Result<Self::Model, ModelError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.running.fetch_sub(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(ModelError::Load("artifact unreadable".to_string()));
        }
        Ok(Arc::clone(&self.model))
    }
}

pub(super) fn service_with(
    model: StubModel,
    output_name: Option<&str>,
) -> (CreditScoreService<StubLoader>, Arc<StubModel>) {
    let loader = StubLoader::new(model);
    let handle = loader.model();
    let service = CreditScoreService::new(
        LazyModel::new(loader, Duration::from_secs(5)),
        output_name.map(str::to_string),
    );
    (service, handle)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
