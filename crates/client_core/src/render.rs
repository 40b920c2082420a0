//! Text helpers for front-ends.

use chrono::{DateTime, Local, Utc};
use shared::{format::format_number, protocol::HistoryEntry};

use crate::calculator::CalculatorState;

pub const EMPTY_HISTORY: &str = "History is empty.";

/// The line above the display: `"{operand} {symbol} {typed}"`, or a single
/// space when nothing is pending.
pub fn expression_preview(state: &CalculatorState) -> String {
    let Some(pending) = state.pending() else {
        return " ".to_string();
    };
    let typed = if state.overwrite() {
        ""
    } else {
        state.display()
    };
    format!(
        "{} {} {typed}",
        format_number(pending.operand),
        pending.operator.display_symbol()
    )
}

pub fn history_expression(entry: &HistoryEntry) -> String {
    format!(
        "{} {} {} = {}",
        format_number(entry.a),
        entry.op.display_symbol(),
        format_number(entry.b),
        format_number(entry.result)
    )
}

pub fn format_time(created_at: &DateTime<Utc>) -> String {
    created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// One line per entry in the order given, or the empty placeholder.
pub fn history_lines(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_HISTORY.to_string()];
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}    {}",
                history_expression(entry),
                format_time(&entry.created_at)
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{Calculator, Input};
    use shared::domain::{EntryId, Operator};

    fn entry(a: f64, b: f64, op: Operator, result: f64) -> HistoryEntry {
        HistoryEntry {
            id: EntryId::new(),
            a,
            b,
            op,
            result,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn preview_is_blank_without_pending_operation() {
        assert_eq!(expression_preview(Calculator::new().state()), " ");
    }

    #[test]
    fn preview_shows_typed_operand_only_when_editing() {
        let mut calc = Calculator::new();
        calc.apply(Input::Digit(7));
        calc.apply(Input::Operator(Operator::Multiply));
        assert_eq!(expression_preview(calc.state()), "7 × ");

        calc.apply(Input::Digit(2));
        assert_eq!(expression_preview(calc.state()), "7 × 2");
    }

    #[test]
    fn history_expression_uses_display_formatting() {
        let line = history_expression(&entry(1.0, 3.0, Operator::Divide, 1.0 / 3.0));
        assert_eq!(line, "1 ÷ 3 = 0.3333333333");
    }

    #[test]
    fn history_lines_keep_received_order() {
        let lines = history_lines(&[
            entry(6.0, 6.0, Operator::Multiply, 36.0),
            entry(2.0, 3.0, Operator::Add, 5.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("6 × 6 = 36"));
        assert!(lines[1].starts_with("2 + 3 = 5"));
    }

    #[test]
    fn empty_history_renders_placeholder() {
        assert_eq!(history_lines(&[]), vec![EMPTY_HISTORY.to_string()]);
    }
}
