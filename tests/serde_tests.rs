#![cfg(feature = "serde")]

use trialview::chart::series;
use trialview::record::{ExperimentConfig, FoldModel, ParamValue, TrialRecord};
use trialview::store::Action;

#[test]
fn trial_record_round_trip() {
    let record = TrialRecord::new(3, 0.82, 125, "auc")
        .with_param("learning_rate", ParamValue::Float(0.05))
        .with_param("booster", ParamValue::Text("dart".to_string()))
        .with_model(FoldModel::new(Some(0), 0.8).with_importance("col_0", 12.5))
        .with_model(FoldModel::new(Some(1), 0.84));

    let json = serde_json::to_string(&record).unwrap();
    let back: TrialRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn trial_record_uses_camel_case_wire_names() {
    let record = TrialRecord::new(1, 0.7, 100, "auc").with_model(FoldModel::new(None, 0.7));
    let json = serde_json::to_string(&record).unwrap();

    assert!(json.contains("\"trialNo\":1"));
    assert!(json.contains("\"avgReward\":0.7"));
    assert!(json.contains("\"metricName\":\"auc\""));
    assert!(json.contains("\"hyperParams\""));
    assert!(!json.contains("trial_no"));
}

#[test]
fn unknown_record_fields_are_ignored() {
    let json = r#"{
        "trialNo": 5,
        "avgReward": 0.9,
        "elapsed": 42,
        "metricName": "auc",
        "models": [{"fold": null, "reward": 0.9}],
        "futureField": {"anything": true}
    }"#;
    let record: TrialRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.trial_no, 5);
    assert_eq!(record.models.len(), 1);
}

#[test]
fn update_action_decodes_from_wire_form() {
    let json = r#"{
        "kind": "update",
        "data": {
            "trialNo": 1,
            "avgReward": 0.7,
            "elapsed": 100,
            "metricName": "auc",
            "models": [{"fold": null, "reward": 0.7, "importances": []}]
        }
    }"#;
    let action = Action::from_json(json).unwrap().unwrap();
    match action {
        Action::Update(record) => {
            assert_eq!(record.trial_no, 1);
            assert_eq!(record.metric_name, "auc");
        }
        _ => panic!("expected an update action"),
    }
}

#[test]
fn unrecognized_action_kind_is_skipped_not_failed() {
    let json = r#"{"kind": "stepFinished", "data": {"index": 2}}"#;
    assert!(Action::from_json(json).unwrap().is_none());
}

#[test]
fn malformed_action_payload_is_an_error() {
    assert!(Action::from_json("not json").is_err());
    assert!(Action::from_json(r#"{"data": {}}"#).is_err());
    assert!(Action::from_json(r#"{"kind": "update", "data": {"nope": 1}}"#).is_err());
}

#[test]
fn chart_options_serialize_with_wire_names() {
    let history = vec![TrialRecord::new(1, 0.7, 100, "auc").with_model(FoldModel::new(None, 0.7))];
    let options = series::build_options(&history, &ExperimentConfig::single_model()).unwrap();

    let json = serde_json::to_string(&options).unwrap();
    assert!(json.contains("\"xAxis\""));
    assert!(json.contains("\"yAxis\":\"reward\""));
    assert!(json.contains("\"kind\":\"line\""));
    assert!(json.contains("\"#1\""));
}
