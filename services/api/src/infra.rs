use credit_score::config::ModelConfig;
use credit_score::scoring::{CreditScoreService, LazyModel, OnnxLoader};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One service per process; the ONNX artifact is read on first use.
pub(crate) fn build_service(config: &ModelConfig) -> Arc<CreditScoreService<OnnxLoader>> {
    let model = LazyModel::new(OnnxLoader::new(config.path.clone()), config.load_timeout);
    Arc::new(CreditScoreService::new(model, config.output_name.clone()))
}
