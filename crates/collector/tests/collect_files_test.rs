//! Collector over saved per-day response files, feeding the aggregator.

use adpulse_collector::{collect_all, source::load_response_file};
use adpulse_reporting::ReportViews;

#[tokio::test]
async fn test_unreadable_day_degrades_to_empty() {
    let dir = std::env::temp_dir().join(format!("adpulse-collect-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();

    let day_one = dir.join("2025-01-01.json");
    let day_two = dir.join("2025-01-02.json");
    tokio::fs::write(
        &day_one,
        r#"{"data": [{"date_start": "2025-01-01", "spend": "100", "impressions": "1000", "clicks": "20",
                      "actions": [{"action_type": "purchase", "value": "2"}]}]}"#,
    )
    .await
    .unwrap();
    tokio::fs::write(&day_two, r#"{"error": {"message": "token expired"}}"#)
        .await
        .unwrap();
    let day_three = dir.join("2025-01-03.json");

    let paths: Vec<String> = [&day_one, &day_two, &day_three]
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let report = collect_all(paths.clone(), 2, |path| load_response_file(path)).await;

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, vec![paths[1].clone(), paths[2].clone()]);

    let overall = ReportViews::new().overall(&report.records);
    assert!((overall.total_spend - 100.0).abs() < 1e-9);
    assert!((overall.average_cpm - 100.0).abs() < 1e-9);
    assert!((overall.cost_per_purchase - 50.0).abs() < 1e-9);

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}
