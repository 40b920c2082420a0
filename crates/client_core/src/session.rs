//! Ties the state machine to the remote service, the history snapshot and the
//! status line.

use std::sync::Arc;

use shared::protocol::{HistoryEntry, DEFAULT_HISTORY_LIMIT};
use tracing::{debug, info, warn};

use crate::{
    calculator::{Calculator, EvaluationRequest, Input, Settled, Ticket, Transition},
    error::ClientError,
    service::CalcService,
    status::StatusLine,
};

pub struct CalculatorSession {
    calculator: Calculator,
    history: Vec<HistoryEntry>,
    status: StatusLine,
    service: Arc<dyn CalcService>,
    history_limit: u32,
}

impl CalculatorSession {
    pub fn new(service: Arc<dyn CalcService>) -> Self {
        Self {
            calculator: Calculator::new(),
            history: Vec::new(),
            status: StatusLine::default(),
            service,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, history_limit: u32) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Last fetched snapshot, in the order the store returned it.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.set(message);
    }

    pub fn service(&self) -> Arc<dyn CalcService> {
        Arc::clone(&self.service)
    }

    /// Applies `input`. When equals is accepted the returned request is in
    /// flight and must be completed with [`Self::finish_evaluation`].
    pub fn press(&mut self, input: Input) -> Option<EvaluationRequest> {
        match self.calculator.apply(input) {
            Transition::Evaluate(request) => {
                debug!(
                    a = request.a,
                    b = request.b,
                    op = %request.op,
                    "evaluation requested"
                );
                Some(request)
            }
            Transition::Rejected(err) => {
                self.status.set(format!("Error: {err}"));
                None
            }
            Transition::Busy => {
                self.status.set("Error: a calculation is already in progress");
                None
            }
            Transition::Updated | Transition::Unchanged => None,
        }
    }

    /// Reconciles the service's answer for `ticket`.
    pub fn finish_evaluation(
        &mut self,
        ticket: Ticket,
        outcome: Result<HistoryEntry, ClientError>,
    ) -> Settled {
        let message = outcome.as_ref().err().map(|err| format!("Error: {err}"));
        let settled = self
            .calculator
            .settle(ticket, outcome.map(|entry| entry.result));
        match settled {
            Settled::Applied(result) => {
                info!(result, "evaluation applied");
                self.status.set("OK: saved to history");
            }
            Settled::Failed => {
                if let Some(message) = message {
                    warn!(%message, "evaluation failed");
                    self.status.set(message);
                }
            }
            Settled::Stale => {}
        }
        settled
    }

    /// Presses `input` and, if it starts an evaluation, awaits the service,
    /// applies the answer and then refreshes history.
    pub async fn press_and_settle(&mut self, input: Input) -> Option<Settled> {
        let request = self.press(input)?;
        let outcome = self.service.evaluate(&request.to_calc_request()).await;
        let settled = self.finish_evaluation(request.ticket, outcome);
        if matches!(settled, Settled::Applied(_)) {
            self.refresh_history().await;
        }
        Some(settled)
    }

    /// Replaces the snapshot. On failure the previous snapshot is kept.
    pub async fn refresh_history(&mut self) -> bool {
        match self.service.fetch_history(self.history_limit).await {
            Ok(entries) => {
                debug!(count = entries.len(), "history refreshed");
                self.history = entries;
                true
            }
            Err(err) => {
                warn!(%err, "history fetch failed");
                self.status.set(format!("History: {err}"));
                false
            }
        }
    }

    /// Empties the snapshot once the store confirms. On failure nothing
    /// changes locally.
    pub async fn clear_history(&mut self) -> bool {
        match self.service.clear_history().await {
            Ok(()) => {
                self.history.clear();
                self.status.set("History cleared");
                true
            }
            Err(err) => {
                warn!(%err, "history clear failed");
                self.status.set(format!("Clear: {err}"));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
