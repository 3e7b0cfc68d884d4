use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

use hris_ai::{RiskModelKind, TriggerEngine};
use hris_events::{EventBus, InMemoryEventBus, Subscription, TriggerEvent};
use hris_infra::HrisConfig;
use hris_infra::directory::{EmployeeStore, InMemoryDirectory};
use hris_infra::models::{ModelStore, ProvisionReport, SharedRiskModel, provision_model};
use hris_infra::seed::{DEFAULT_SEED, seed_sample_data};
use hris_infra::triggers::{InMemoryTriggerStore, JsonlTriggerStore, PublishingTriggerStore, TriggerStore};
use hris_infra::{DashboardAggregator, DashboardError, DashboardSnapshot};

pub const TRIGGER_FIRED_TOPIC: &str = "trigger.fired";

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Everything a request handler needs, built once at startup.
pub struct AppServices {
    pub directory: Arc<InMemoryDirectory>,
    pub model_store: Arc<dyn ModelStore>,
    pub payroll_model: SharedRiskModel,
    pub attrition_model: SharedRiskModel,
    pub engine: TriggerEngine,
    pub triggers: Arc<dyn TriggerStore>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    pub fn model(&self, kind: RiskModelKind) -> &SharedRiskModel {
        match kind {
            RiskModelKind::Payroll => &self.payroll_model,
            RiskModelKind::Attrition => &self.attrition_model,
        }
    }

    /// Evaluate the whole directory against the models currently served.
    pub fn dashboard_snapshot(&self) -> Result<DashboardSnapshot, DashboardError> {
        let employees = EmployeeStore::list_all(&*self.directory)?;
        let aggregator = DashboardAggregator::new(
            self.payroll_model.current(),
            self.attrition_model.current(),
            self.triggers.clone(),
            self.directory.clone(),
        )
        .with_engine(self.engine.clone());
        aggregator.build_snapshot(&employees)
    }

    /// Force-train `kind` from the current directory and swap it in.
    ///
    /// Requests that already hold the previous model finish with it.
    pub fn retrain(&self, kind: RiskModelKind) -> anyhow::Result<ProvisionReport> {
        let employees = EmployeeStore::list_all(&*self.directory)?;
        let provisioned = provision_model(kind, &*self.model_store, &employees, true)?;
        self.model(kind).replace(provisioned.model);
        info!(kind = %kind, origin = ?provisioned.report.origin, "risk model replaced");
        Ok(provisioned.report)
    }
}

pub async fn build_services(config: &HrisConfig) -> anyhow::Result<AppServices> {
    let directory = Arc::new(InMemoryDirectory::new());
    if config.seed_sample_data {
        let report = seed_sample_data(&*directory, DEFAULT_SEED).context("seeding sample data")?;
        info!(
            employees = report.employees,
            payrolls = report.payrolls,
            attendance = report.attendance,
            "sample data seeded"
        );
    }

    let employees = EmployeeStore::list_all(&*directory)?;
    let model_store: Arc<dyn ModelStore> = Arc::new(config.model_store());
    let payroll = provision_model(RiskModelKind::Payroll, &*model_store, &employees, config.force_retrain)?;
    let attrition = provision_model(
        RiskModelKind::Attrition,
        &*model_store,
        &employees,
        config.force_retrain,
    )?;

    let durable: Arc<dyn TriggerStore> = match &config.trigger_log {
        Some(path) => Arc::new(
            JsonlTriggerStore::open(path).with_context(|| format!("opening trigger log {}", path.display()))?,
        ),
        None => Arc::new(InMemoryTriggerStore::new()),
    };

    // Trigger bus → realtime channel (SSE).
    let bus: Arc<InMemoryEventBus<TriggerEvent>> = Arc::new(InMemoryEventBus::new());
    let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);
    spawn_trigger_forwarder(bus.subscribe(), realtime_tx.clone());

    let triggers: Arc<dyn TriggerStore> = Arc::new(PublishingTriggerStore::new(durable, bus));

    Ok(AppServices {
        directory,
        model_store,
        payroll_model: SharedRiskModel::new(payroll.model),
        attrition_model: SharedRiskModel::new(attrition.model),
        engine: TriggerEngine::default(),
        triggers,
        realtime_tx,
    })
}

/// The bus subscription blocks, so it is drained on the blocking pool. The
/// loop ends once the bus (owned by the trigger store) is dropped.
fn spawn_trigger_forwarder(
    subscription: Subscription<TriggerEvent>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
) {
    tokio::task::spawn_blocking(move || loop {
        match subscription.recv() {
            Ok(event) => {
                let payload = match serde_json::to_value(&event) {
                    Ok(v) => v,
                    Err(e) => {
                        debug!(error = %e, "trigger not forwarded");
                        continue;
                    }
                };
                // No SSE clients is not an error.
                let _ = realtime_tx.send(RealtimeMessage {
                    topic: TRIGGER_FIRED_TOPIC.to_string(),
                    payload,
                });
            }
            Err(_) => break,
        }
    });
}

pub fn trigger_sse_stream(
    services: Arc<AppServices>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(m) => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        // Lagged receivers skip what they missed; the trigger log has it.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
