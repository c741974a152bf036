//! Risk monitor
//!
//! Recomputes the risk board whenever the batch projection or the forecast
//! changes and alerts the farmer about severe batches. Each (batch, tier)
//! pair is alerted once; a batch that leaves monitoring is forgotten.
//! Batches are tracked by their stable id, so a batch created offline is not
//! alerted again when sync gives it a store id.

use std::collections::{HashMap, HashSet};

use shared::{risk_board, Advisory, Batch, BatchRisk, RiskLevel, WeatherForecast};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::services::advisory::AdvisoryService;

/// An alert raised for one batch
#[derive(Debug, Clone)]
pub struct RiskAlert {
    pub batch_id: Uuid,
    pub risk_level: RiskLevel,
    pub advisory: Advisory,
}

pub struct RiskMonitor {
    advisory: AdvisoryService,
    alerted: HashSet<(Uuid, RiskLevel)>,
}

impl RiskMonitor {
    pub fn new(advisory: AdvisoryService) -> Self {
        Self {
            advisory,
            alerted: HashSet::new(),
        }
    }

    /// Score every monitored batch and alert on new severe tiers
    pub fn evaluate(
        &mut self,
        batches: &[Batch],
        forecast: Option<&WeatherForecast>,
    ) -> (Vec<BatchRisk>, Vec<RiskAlert>) {
        let board = risk_board(batches, forecast);

        let stable_ids: HashMap<Uuid, Uuid> = batches
            .iter()
            .filter(|b| b.is_monitored())
            .map(|b| (b.id, b.stable_id()))
            .collect();
        let monitored: HashSet<Uuid> = stable_ids.values().copied().collect();
        self.alerted.retain(|(id, _)| monitored.contains(id));

        let mut alerts = Vec::new();
        for entry in &board {
            let level = entry.risk.risk_level;
            let stable_id = stable_ids
                .get(&entry.batch_id)
                .copied()
                .unwrap_or(entry.batch_id);
            if !level.is_severe() || !self.alerted.insert((stable_id, level)) {
                continue;
            }

            tracing::warn!(
                batch_id = %entry.batch_id,
                crop = %entry.crop_type,
                %level,
                etcl_hours = %entry.risk.etcl_hours,
                "Batch at severe spoilage risk"
            );
            let advisory = self.advisory.advise(&entry.crop_type, forecast, level);
            alerts.push(RiskAlert {
                batch_id: entry.batch_id,
                risk_level: level,
                advisory,
            });
        }

        (board, alerts)
    }

    /// Run until either feed closes
    pub fn spawn(
        mut self,
        mut batches: watch::Receiver<Vec<Batch>>,
        mut forecasts: watch::Receiver<Option<WeatherForecast>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                {
                    let current = batches.borrow_and_update().clone();
                    let forecast = forecasts.borrow_and_update().clone();
                    self.evaluate(&current, forecast.as_ref());
                }

                tokio::select! {
                    changed = batches.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = forecasts.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Risk monitor stopped");
        })
    }
}
