//! Stock balance tests
//!
//! Receipts and issues keep the Stock table in step with the lots;
//! reconciliation reports where the two drifted apart.

mod support;

use std::sync::Arc;

use inventory_server::error::AppError;
use inventory_server::services::inventory::{IssueOutwardInput, RecordInwardInput};
use inventory_server::store::{MemoryStore, Table};
use rust_decimal::Decimal;
use support::*;

fn receive(item: &str, quantity: i64, unit_cost: i64) -> RecordInwardInput {
    RecordInwardInput {
        item: item.to_string(),
        quantity,
        unit_cost: Decimal::from(unit_cost),
        supplier: "Acme".to_string(),
    }
}

#[tokio::test]
async fn test_inward_raises_existing_balance() {
    let store = Arc::new(bolt_store());

    let receipt = inventory(&store)
        .record_inward("asha", receive("bolt", 5, 4))
        .await
        .unwrap();

    assert_eq!(receipt.stock_balance, 20);
    assert_eq!(receipt.item, "bolt");
    assert_eq!(stock_balance(&store, "Bolt").await.as_deref(), Some("20"));

    let inward = store.rows(Table::Inward).await;
    assert_eq!(inward.len(), 3);
    assert_eq!(inward[2][1], "bolt");
    assert_eq!(inward[2][2], "5");
    assert_eq!(inward[2][3], "4");
    assert_eq!(inward[2][4], "Acme");
    assert_eq!(inward[2][5], "5");
}

#[tokio::test]
async fn test_inward_creates_stock_entry_for_new_item() {
    let store = Arc::new(bolt_store());

    inventory(&store)
        .record_inward("asha", receive("  Washer ", 100, 1))
        .await
        .unwrap();

    assert_eq!(store.rows(Table::Stock).await.len(), 2);
    assert_eq!(stock_balance(&store, "Washer").await.as_deref(), Some("100"));
}

#[tokio::test]
async fn test_zero_cost_inward_is_accepted() {
    let store = Arc::new(MemoryStore::new());

    inventory(&store)
        .record_inward("asha", receive("Sample", 3, 0))
        .await
        .unwrap();

    let receipt = inventory(&store)
        .issue_outward(
            "asha",
            IssueOutwardInput {
                item: "Sample".into(),
                quantity: 2,
                issued_to: "Lab".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.total_cost, Decimal::ZERO);
    assert_eq!(stock_balance(&store, "Sample").await.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_inward_rejects_negative_cost() {
    let store = Arc::new(MemoryStore::new());
    let mut input = receive("Bolt", 3, 0);
    input.unit_cost = Decimal::new(-150, 2);

    let err = inventory(&store).record_inward("asha", input).await.unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "unit_cost"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_inward_rejects_blank_supplier() {
    let store = Arc::new(MemoryStore::new());
    let mut input = receive("Bolt", 3, 1);
    input.supplier = "   ".into();

    let err = inventory(&store).record_inward("asha", input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_update_stock_refuses_unreadable_balance() {
    let store = Arc::new(MemoryStore::new().with_rows(Table::Stock, [["Bolt", "lots"]]));

    let err = stock(&store).update_stock("Bolt", 5).await.unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
    assert_eq!(store.write_count(), 0);
    assert_eq!(stock_balance(&store, "Bolt").await.as_deref(), Some("lots"));
}

#[tokio::test]
async fn test_update_stock_truncates_decimal_balance() {
    let store = Arc::new(MemoryStore::new().with_rows(Table::Stock, [["Bolt", "7.9"]]));

    let entry = stock(&store).update_stock("BOLT", -2).await.unwrap();
    assert_eq!(entry.balance, 5);
    assert_eq!(entry.item, "Bolt");
    assert_eq!(stock_balance(&store, "Bolt").await.as_deref(), Some("5"));
}

#[tokio::test]
async fn test_list_stock_skips_unreadable_rows() {
    let store = Arc::new(
        MemoryStore::new().with_rows(Table::Stock, [["Bolt", "15"], ["Nut", ""], ["Washer", "4"]]),
    );

    let entries = stock(&store).list_stock().await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.item.as_str()).collect();
    assert_eq!(names, vec!["Bolt", "Washer"]);
    assert_eq!(entries[1].row, 2);
}

#[tokio::test]
async fn test_item_detail_values_open_lots() {
    let store = Arc::new(bolt_store());

    let detail = stock(&store).item_detail(" BOLT").await.unwrap();
    assert_eq!(detail.item, "Bolt");
    assert_eq!(detail.recorded_balance, Some(15));
    assert_eq!(detail.available_in_lots, 15);
    assert_eq!(detail.stock_value, Decimal::from(35));
    assert_eq!(detail.lots.len(), 2);
}

#[tokio::test]
async fn test_item_detail_unknown_item() {
    let store = Arc::new(bolt_store());
    let err = stock(&store).item_detail("Gear").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_reconcile_clean_after_movements() {
    let store = Arc::new(bolt_store());
    let service = inventory(&store);

    service
        .record_inward("asha", receive("Bolt", 5, 4))
        .await
        .unwrap();
    service
        .issue_outward(
            "asha",
            IssueOutwardInput {
                item: "Bolt".into(),
                quantity: 13,
                issued_to: "Workshop".into(),
            },
        )
        .await
        .unwrap();

    assert!(stock(&store).reconcile().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reconcile_reports_drift_and_missing_entries() {
    let store = Arc::new(
        MemoryStore::new()
            .with_rows(
                Table::Inward,
                [
                    inward_row("Bolt", 10, "2", 10),
                    inward_row("Nut", 40, "1", 40),
                ],
            )
            .with_rows(Table::Stock, [["Bolt", "12"], ["Gear", "3"]]),
    );

    let report = stock(&store).reconcile().await.unwrap();
    assert_eq!(report.len(), 3);

    let bolt = report.iter().find(|d| d.item == "Bolt").unwrap();
    assert_eq!(bolt.recorded_balance, Some(12));
    assert_eq!(bolt.lot_balance, 10);
    assert_eq!(bolt.difference, 2);

    let gear = report.iter().find(|d| d.item == "Gear").unwrap();
    assert_eq!(gear.lot_balance, 0);
    assert_eq!(gear.difference, 3);

    let nut = report.iter().find(|d| d.item == "Nut").unwrap();
    assert_eq!(nut.recorded_balance, None);
    assert_eq!(nut.difference, -40);
}
