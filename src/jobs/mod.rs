//! Scheduled Jobs
//!
//! Background sweep that moves overdue payables, receivables and schedule
//! lines to VENCIDO. Runs on a fixed interval; can also be triggered once
//! through the API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::domain::OperationContext;
use crate::handlers::{ResultadoVencimento, ResultadoVencimentos};
use crate::state::AppState;

// =========================================================================
// Overdue sweep
// =========================================================================

/// Sweep every money aggregate once.
///
/// The three sweeps are independent: a failing one is reported in `errors`
/// and the others still run.
pub async fn processar_vencimentos(
    state: &AppState,
    agora: DateTime<Utc>,
    context: &OperationContext,
) -> MaintenanceReport {
    let mut report = MaintenanceReport::default();

    report.vencimentos.contas_pagar = registrar(
        &mut report.errors,
        "Contas a pagar",
        state.contas_pagar.processar_vencidas(agora, context).await,
    );
    report.vencimentos.contas_receber = registrar(
        &mut report.errors,
        "Contas a receber",
        state.contas_receber.processar_vencidas(agora, context).await,
    );
    report.vencimentos.cronogramas = registrar(
        &mut report.errors,
        "Cronogramas",
        state.cronogramas.processar_vencidos(agora, context).await,
    );

    report.completed_at = Utc::now();
    report
}

fn registrar<E: std::fmt::Display>(
    errors: &mut Vec<String>,
    rotulo: &str,
    resultado: Result<ResultadoVencimento, E>,
) -> ResultadoVencimento {
    match resultado {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(sweep = rotulo, error = %e, "Overdue sweep failed");
            errors.push(format!("{}: {}", rotulo, e));
            ResultadoVencimento::default()
        }
    }
}

/// Report from one overdue sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceReport {
    pub vencimentos: ResultadoVencimentos,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl MaintenanceReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.vencimentos.total_falhas() == 0
    }
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval between overdue sweeps (default: 1 hour)
    pub vencimentos_interval: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            vencimentos_interval: Duration::from_secs(3600),
        }
    }
}

/// Job Scheduler - runs the overdue sweep periodically
pub struct JobScheduler {
    state: AppState,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    pub fn with_config(state: AppState, config: JobSchedulerConfig) -> Self {
        Self { state, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.vencimentos_interval.as_secs(),
            "Job scheduler started"
        );

        let mut vencimentos = interval(self.config.vencimentos_interval);
        vencimentos.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            vencimentos.tick().await;
            let report = self.run_all_once().await;
            if !report.is_clean() {
                tracing::warn!(
                    falhas = report.vencimentos.total_falhas(),
                    errors = report.errors.len(),
                    "Overdue sweep finished with failures"
                );
            }
        }
    }

    /// Run the sweep once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        processar_vencimentos(&self.state, Utc::now(), &OperationContext::system()).await
    }
}

// =========================================================================
// Tests
// =========================================================================
