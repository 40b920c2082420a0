//! Keypad input state machine.
//!
//! [`Calculator`] folds discrete [`Input`] events into a [`CalculatorState`].
//! Every transition is synchronous except equals, which hands back an
//! [`EvaluationRequest`] for the caller to send to the evaluation service and
//! later reconcile with [`Calculator::settle`].
//!
//! At most one evaluation may be in flight. While a request is outstanding a
//! further equals is answered with [`Transition::Busy`] and changes nothing.
//! Only the response carrying the outstanding [`Ticket`] is applied; clear
//! abandons the outstanding ticket so its late response is dropped as stale.

use shared::{
    arithmetic::{self, ArithmeticError},
    domain::Operator,
    format::format_number,
    protocol::CalcRequest,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    /// A decimal digit, `0..=9`. Larger values are ignored.
    Digit(u8),
    Decimal,
    ToggleSign,
    Backspace,
    Clear,
    Operator(Operator),
    Equals,
}

/// Left-hand operand and operator captured when an operator is chosen. The
/// two only ever exist together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pending {
    pub operand: f64,
    pub operator: Operator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorState {
    display: String,
    pending: Option<Pending>,
    overwrite: bool,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            pending: None,
            overwrite: true,
        }
    }
}

impl CalculatorState {
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn pending_operand(&self) -> Option<f64> {
        self.pending.map(|p| p.operand)
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.pending.map(|p| p.operator)
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    fn display_value(&self) -> f64 {
        self.display.parse().unwrap_or_default()
    }
}

/// Identifies the single evaluation request allowed in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationRequest {
    pub ticket: Ticket,
    pub a: f64,
    pub b: f64,
    pub op: Operator,
}

impl EvaluationRequest {
    pub fn to_calc_request(&self) -> CalcRequest {
        CalcRequest {
            a: self.a,
            b: self.b,
            op: self.op,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Updated,
    /// The input was a no-op in the current state.
    Unchanged,
    /// A chained operator hit a local arithmetic error; nothing changed.
    Rejected(ArithmeticError),
    /// Equals was accepted; the request is now in flight.
    Evaluate(EvaluationRequest),
    /// Equals while another evaluation is outstanding.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settled {
    Applied(f64),
    Failed,
    /// The ticket is not the outstanding one; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct Calculator {
    state: CalculatorState,
    in_flight: Option<EvaluationRequest>,
    next_ticket: u64,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<&EvaluationRequest> {
        self.in_flight.as_ref()
    }

    pub fn is_evaluating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn apply(&mut self, input: Input) -> Transition {
        match input {
            Input::Digit(digit) => self.input_digit(digit),
            Input::Decimal => self.input_decimal(),
            Input::ToggleSign => self.toggle_sign(),
            Input::Backspace => self.backspace(),
            Input::Clear => self.clear(),
            Input::Operator(op) => self.choose_operator(op),
            Input::Equals => self.equals(),
        }
    }

    fn input_digit(&mut self, digit: u8) -> Transition {
        let Some(ch) = char::from_digit(u32::from(digit), 10) else {
            return Transition::Unchanged;
        };

        let state = &mut self.state;
        if state.overwrite || state.display == "0" {
            state.display = ch.to_string();
            state.overwrite = false;
        } else {
            state.display.push(ch);
        }
        Transition::Updated
    }

    fn input_decimal(&mut self) -> Transition {
        let state = &mut self.state;
        if state.overwrite {
            state.display = "0.".to_string();
            state.overwrite = false;
        } else if state.display.contains('.') {
            return Transition::Unchanged;
        } else {
            state.display.push('.');
        }
        Transition::Updated
    }

    fn toggle_sign(&mut self) -> Transition {
        let state = &mut self.state;
        if state.display == "0" {
            return Transition::Unchanged;
        }
        state.display = match state.display.strip_prefix('-') {
            Some(positive) => positive.to_string(),
            None => format!("-{}", state.display),
        };
        Transition::Updated
    }

    fn backspace(&mut self) -> Transition {
        let state = &mut self.state;
        if state.overwrite {
            return Transition::Unchanged;
        }
        if state.display.len() > 1 {
            state.display.pop();
            if state.display == "-" || state.display == "-0" {
                state.display = "0".to_string();
            }
        } else if state.display == "0" {
            return Transition::Unchanged;
        } else {
            state.display = "0".to_string();
        }
        Transition::Updated
    }

    fn clear(&mut self) -> Transition {
        self.state = CalculatorState::default();
        if let Some(abandoned) = self.in_flight.take() {
            debug!(ticket = abandoned.ticket.0, "clear abandoned in-flight evaluation");
        }
        Transition::Updated
    }

    fn choose_operator(&mut self, next: Operator) -> Transition {
        let state = &mut self.state;
        match state.pending {
            None => {
                state.pending = Some(Pending {
                    operand: state.display_value(),
                    operator: next,
                });
                state.overwrite = true;
            }
            Some(pending) if !state.overwrite => {
                let local = match arithmetic::evaluate(
                    pending.operand,
                    state.display_value(),
                    pending.operator,
                ) {
                    Ok(value) => value,
                    Err(err) => return Transition::Rejected(err),
                };
                state.pending = Some(Pending {
                    operand: local,
                    operator: next,
                });
                state.display = format_number(local);
                state.overwrite = true;
            }
            Some(pending) => {
                state.pending = Some(Pending {
                    operator: next,
                    ..pending
                });
            }
        }
        Transition::Updated
    }

    fn equals(&mut self) -> Transition {
        let Some(pending) = self.state.pending else {
            return Transition::Unchanged;
        };
        if self.in_flight.is_some() {
            return Transition::Busy;
        }

        // Equals straight after an operator applies it to the operand itself.
        let b = if self.state.overwrite {
            pending.operand
        } else {
            self.state.display_value()
        };

        self.next_ticket += 1;
        let request = EvaluationRequest {
            ticket: Ticket(self.next_ticket),
            a: pending.operand,
            b,
            op: pending.operator,
        };
        self.in_flight = Some(request);
        Transition::Evaluate(request)
    }

    /// Reconciles the outcome of the request identified by `ticket`.
    ///
    /// A failure leaves the state exactly as it was and re-enables equals.
    pub fn settle<E>(&mut self, ticket: Ticket, outcome: Result<f64, E>) -> Settled {
        let Some(request) = self.in_flight.filter(|r| r.ticket == ticket) else {
            debug!(ticket = ticket.0, "dropping stale evaluation response");
            return Settled::Stale;
        };
        self.in_flight = None;

        match outcome {
            Ok(result) => {
                let operator = self.state.pending_operator().unwrap_or(request.op);
                self.state.pending = Some(Pending {
                    operand: result,
                    operator,
                });
                self.state.display = format_number(result);
                self.state.overwrite = true;
                Settled::Applied(result)
            }
            Err(_) => Settled::Failed,
        }
    }
}

#[cfg(test)]
#[path = "tests/calculator_tests.rs"]
mod tests;
