use std::time::Instant;

use client_core::{
    render::{expression_preview, history_lines},
    CalculatorSession,
};

/// The keypad panel: expression preview, display, and the status line when
/// one is showing.
pub fn frame_lines(session: &CalculatorSession, now: Instant) -> Vec<String> {
    let state = session.calculator().state();
    let mut lines = vec![
        format!("  {}", expression_preview(state)),
        format!("= {}", state.display()),
    ];
    if session.calculator().is_evaluating() {
        lines.push("  (calculating...)".to_string());
    }
    if let Some(message) = session.status().current_at(now) {
        lines.push(format!("  {message}"));
    }
    lines
}

pub fn history_panel(session: &CalculatorSession) -> Vec<String> {
    let mut lines = vec!["-- history --".to_string()];
    lines.extend(
        history_lines(session.history())
            .into_iter()
            .map(|line| format!("  {line}")),
    );
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{render::EMPTY_HISTORY, ApiBase, HttpCalcService, Input};
    use shared::domain::Operator;
    use std::sync::Arc;

    fn session() -> CalculatorSession {
        CalculatorSession::new(Arc::new(HttpCalcService::new(ApiBase::default())))
    }

    #[test]
    fn frame_shows_preview_and_display() {
        let mut session = session();
        session.press(Input::Digit(4));
        session.press(Input::Operator(Operator::Add));
        session.press(Input::Digit(2));

        let lines = frame_lines(&session, Instant::now());
        assert_eq!(lines, vec!["  4 + 2".to_string(), "= 2".to_string()]);
    }

    #[test]
    fn frame_includes_live_status() {
        let mut session = session();
        session.set_status("History cleared");
        let lines = frame_lines(&session, Instant::now());
        assert_eq!(lines.last().map(String::as_str), Some("  History cleared"));
    }

    #[test]
    fn frame_marks_in_flight_evaluation() {
        let mut session = session();
        session.press(Input::Digit(3));
        session.press(Input::Operator(Operator::Multiply));
        assert!(session.press(Input::Equals).is_some());

        let lines = frame_lines(&session, Instant::now());
        assert!(lines.contains(&"  (calculating...)".to_string()));
    }

    #[test]
    fn empty_history_panel_shows_placeholder() {
        let lines = history_panel(&session());
        assert_eq!(lines[1], format!("  {EMPTY_HISTORY}"));
    }
}
