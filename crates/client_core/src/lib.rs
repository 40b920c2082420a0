//! Client side of the calculator: the keypad state machine, keyboard
//! mapping, the HTTP client for the evaluation/history service and the
//! session that ties them together.

pub mod calculator;
pub mod error;
pub mod keys;
pub mod render;
pub mod service;
pub mod session;
pub mod status;

pub use calculator::{
    Calculator, CalculatorState, EvaluationRequest, Input, Pending, Settled, Ticket, Transition,
};
pub use error::ClientError;
pub use service::{ApiBase, CalcService, HttpCalcService, DEFAULT_API_BASE};
pub use session::CalculatorSession;
pub use status::{StatusLine, STATUS_TTL};
