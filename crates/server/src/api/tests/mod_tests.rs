use super::*;
use shared::error::ErrorCode;

async fn setup(history_retention: u32) -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext {
        storage,
        history_retention,
    }
}

fn input(a: f64, b: f64, op: &str) -> CalcInput {
    CalcInput {
        a,
        b,
        op: op.to_string(),
    }
}

#[tokio::test]
async fn calculate_stores_entry_with_result() {
    let ctx = setup(200).await;
    let entry = calculate(&ctx, input(2.0, 3.0, "+"))
        .await
        .expect("calculate");
    assert_eq!(entry.result, 5.0);
    assert_eq!(entry.op, Operator::Add);

    let history = list_history(&ctx, None).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, entry.id);
}

#[tokio::test]
async fn division_by_zero_is_rejected_and_not_stored() {
    let ctx = setup(200).await;
    let err = calculate(&ctx, input(1.0, 0.0, "/"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.detail, "Division by zero");
    assert!(list_history(&ctx, None).await.expect("history").is_empty());
}

#[tokio::test]
async fn unsupported_operator_is_rejected() {
    let ctx = setup(200).await;
    let err = calculate(&ctx, input(1.0, 2.0, "%"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert_eq!(err.detail, "Unsupported operation");
}

#[tokio::test]
async fn history_limit_must_be_in_range() {
    let ctx = setup(200).await;
    for limit in [0, -3, 201] {
        let err = list_history(&ctx, Some(limit))
            .await
            .expect_err("should fail");
        assert_eq!(err.detail, "limit must be 1..200");
    }
    assert!(list_history(&ctx, Some(200)).await.is_ok());
    assert!(list_history(&ctx, Some(1)).await.is_ok());
}

#[tokio::test]
async fn history_is_newest_first_and_bounded_by_retention() {
    let ctx = setup(2).await;
    for a in [1.0, 2.0, 3.0] {
        calculate(&ctx, input(a, 1.0, "*")).await.expect("calculate");
    }

    let history = list_history(&ctx, Some(10)).await.expect("history");
    let operands: Vec<f64> = history.iter().map(|e| e.a).collect();
    assert_eq!(operands, vec![3.0, 2.0]);
}

#[tokio::test]
async fn clear_reports_deleted_rows() {
    let ctx = setup(200).await;
    calculate(&ctx, input(4.0, 2.0, "-")).await.expect("calculate");
    calculate(&ctx, input(4.0, 2.0, "/")).await.expect("calculate");

    assert_eq!(clear_history(&ctx).await.expect("clear"), 2);
    assert!(list_history(&ctx, None).await.expect("history").is_empty());
}
