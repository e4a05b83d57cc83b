//! Lifecycle acceptance tests for the `signalfx_log_view` resource,
//! driven against an in-process API fake the way a host would drive the
//! provider: plan, apply, read back, import, destroy.

mod common;

use common::{spawn_api, FakeSignalFx, TEST_TOKEN};
use hemmer_provider_signalfx::testing::{
    assert_plan_changes_attribute, assert_plan_creates, assert_plan_no_changes,
    assert_plan_updates_in_place, ProviderTester,
};
use hemmer_provider_signalfx::{ProviderError, SignalFxProvider, LOG_VIEW_TYPE};
use serde_json::{json, Value};

async fn configured_tester(api_url: &str) -> ProviderTester<SignalFxProvider> {
    let tester = ProviderTester::new(SignalFxProvider::new());
    tester
        .configure(json!({
            "auth_token": TEST_TOKEN,
            "api_url": api_url,
        }))
        .await
        .unwrap();
    tester
}

fn create_config() -> Value {
    json!({
        "name": "Chart Name",
        "description": "Chart Description",
        "program_text": "logs(index=['history','main','o11yhipster','splunklogger','summary']).publish()",
        "time_range": 900,
        "default_connection": "Cosmicbat",
        "columns": [
            {"name": "severity"},
            {"name": "time"},
            {"name": "_raw"}
        ],
        "sort_options": [
            {"descending": false, "field": "severity"}
        ]
    })
}

fn update_config() -> Value {
    json!({
        "name": "Chart Name NEW",
        "description": "Chart Description NEW",
        "program_text": "logs().publish()",
        "start_time": 1_657_647_022,
        "end_time": 1_657_648_042,
        "default_connection": "Cosmicbat",
        "columns": [
            {"name": "severity"},
            {"name": "time"},
            {"name": "_raw"}
        ],
        "sort_options": [
            {"descending": true, "field": "severity"}
        ]
    })
}

#[tokio::test]
async fn test_log_view_full_lifecycle() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake.clone()).await;
    let tester = configured_tester(&api_url).await;

    tester
        .validate_resource_config(LOG_VIEW_TYPE, create_config())
        .await
        .unwrap();

    // Create
    let plan = tester
        .plan_create(LOG_VIEW_TYPE, create_config())
        .await
        .unwrap();
    assert_plan_creates(&plan);

    let created = tester
        .create(LOG_VIEW_TYPE, plan.planned_state)
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["name"], "Chart Name");
    assert_eq!(created["description"], "Chart Description");
    assert_eq!(
        created["program_text"],
        "logs(index=['history','main','o11yhipster','splunklogger','summary']).publish()"
    );
    assert_eq!(created["time_range"], 900);
    assert_eq!(created["default_connection"], "Cosmicbat");
    assert_eq!(
        created["columns"],
        json!([{"name": "severity"}, {"name": "time"}, {"name": "_raw"}])
    );
    assert_eq!(
        created["sort_options"],
        json!([{"descending": false, "field": "severity"}])
    );
    assert_eq!(
        created["url"].as_str().unwrap(),
        format!("https://app.signalfx.com/#chart/{}", id)
    );
    assert!(created.get("start_time").is_none());

    // The API saw camelCase keys and millisecond times
    let wire = fake.chart(&id).unwrap();
    assert_eq!(wire["programText"], created["program_text"]);
    assert_eq!(wire["options"]["type"], "LogsChart");
    assert_eq!(wire["options"]["defaultConnection"], "Cosmicbat");
    assert_eq!(
        wire["options"]["time"],
        json!({"type": "relative", "range": 900_000})
    );
    assert_eq!(wire["options"]["sortOptions"][0]["descending"], false);

    // Read returns the same state
    let read = tester.read(LOG_VIEW_TYPE, created.clone()).await.unwrap();
    assert_eq!(read, created);

    // Import produces state matching what create stored
    let imported = tester
        .import_resource(LOG_VIEW_TYPE, &id)
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, LOG_VIEW_TYPE);
    assert_eq!(imported[0].state, created);

    // Re-planning the unchanged config is a no-op
    let plan = tester
        .plan_update(LOG_VIEW_TYPE, created.clone(), create_config())
        .await
        .unwrap();
    assert_plan_no_changes(&plan);
    assert_eq!(plan.planned_state["id"], json!(id));

    // Update
    let plan = tester
        .plan_update(LOG_VIEW_TYPE, created.clone(), update_config())
        .await
        .unwrap();
    assert_plan_changes_attribute(&plan, "name");
    assert_plan_changes_attribute(&plan, "start_time");
    assert_plan_updates_in_place(&plan);
    assert_eq!(plan.planned_state["id"], json!(id));

    let updated = tester
        .update(LOG_VIEW_TYPE, created.clone(), plan.planned_state)
        .await
        .unwrap();
    assert_eq!(updated["id"], json!(id));
    assert_eq!(updated["name"], "Chart Name NEW");
    assert_eq!(updated["description"], "Chart Description NEW");
    assert_eq!(updated["program_text"], "logs().publish()");
    assert_eq!(updated["start_time"], 1_657_647_022);
    assert_eq!(updated["end_time"], 1_657_648_042);
    assert!(updated.get("time_range").is_none());
    assert_eq!(updated["sort_options"][0]["descending"], true);
    assert_eq!(updated["url"], created["url"]);

    let wire = fake.chart(&id).unwrap();
    assert_eq!(
        wire["options"]["time"],
        json!({"type": "absolute", "start": 1_657_647_022_000i64, "end": 1_657_648_042_000i64})
    );

    // Destroy
    let plan = tester
        .plan_delete(LOG_VIEW_TYPE, updated.clone())
        .await
        .unwrap();
    assert!(plan.planned_state.is_null());

    tester.delete(LOG_VIEW_TYPE, updated.clone()).await.unwrap();
    assert_eq!(fake.chart_count(), 0);

    // Reading the destroyed resource reports it gone
    let gone = tester.read(LOG_VIEW_TYPE, updated).await.unwrap();
    assert!(gone.is_null());
}

#[tokio::test]
async fn test_log_view_minimal_config() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake.clone()).await;
    let tester = configured_tester(&api_url).await;

    let created = tester
        .lifecycle_create(
            LOG_VIEW_TYPE,
            json!({"name": "Service logs", "program_text": "logs().publish()"}),
        )
        .await
        .unwrap();

    assert_eq!(created["name"], "Service logs");
    assert!(created.get("columns").is_none());
    assert!(created.get("description").is_none());
    assert!(created.get("time_range").is_none());

    // Options carry only the chart type when nothing else is configured
    let id = created["id"].as_str().unwrap();
    let wire = fake.chart(id).unwrap();
    assert_eq!(wire["options"], json!({"type": "LogsChart"}));
}

#[tokio::test]
async fn test_import_unmanaged_log_view() {
    let fake = FakeSignalFx::new();
    fake.insert_chart(
        "GvmZ0BcAcAA",
        json!({
            "name": "Chart Name",
            "description": "Chart Description",
            "programText": "logs().publish()",
            "options": {
                "type": "LogsChart",
                "defaultConnection": "Cosmicbat",
                "columns": [{"name": "severity"}, {"name": "_raw"}],
                "sortOptions": [{"descending": true, "field": "severity"}],
                "time": {"type": "relative", "range": 900_000}
            }
        }),
    );
    let api_url = spawn_api(fake.clone()).await;
    let tester = configured_tester(&api_url).await;

    let imported = tester
        .import_resource(LOG_VIEW_TYPE, "GvmZ0BcAcAA")
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);

    let state = &imported[0].state;
    assert_eq!(state["id"], "GvmZ0BcAcAA");
    assert_eq!(state["name"], "Chart Name");
    assert_eq!(state["time_range"], 900);
    assert_eq!(state["columns"], json!([{"name": "severity"}, {"name": "_raw"}]));
    assert_eq!(state["sort_options"][0]["descending"], true);
    assert_eq!(state["url"], "https://app.signalfx.com/#chart/GvmZ0BcAcAA");
}

#[tokio::test]
async fn test_import_missing_log_view() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake).await;
    let tester = configured_tester(&api_url).await;

    let err = tester
        .import_resource(LOG_VIEW_TYPE, "does-not-exist")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn test_update_surfaces_missing_chart() {
    let fake = FakeSignalFx::new();
    let api_url = spawn_api(fake).await;
    let tester = configured_tester(&api_url).await;

    let state = json!({
        "id": "vanished",
        "name": "Chart Name",
        "program_text": "logs().publish()"
    });
    let err = tester
        .update(LOG_VIEW_TYPE, state.clone(), state)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
