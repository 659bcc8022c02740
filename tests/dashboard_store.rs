use agency_dashboard::dashboard::store::{DashboardStore, JsonFileStore};
use agency_dashboard::dashboard::templates::ApplyMode;
use agency_dashboard::dashboard::Dashboard;
use agency_dashboard::settings::Settings;
use tempfile::tempdir;

#[test]
fn from_settings_persists_next_to_settings_file() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let settings = Settings {
        dashboard_file: "state/dashboard.json".into(),
        default_tab_name: "Acme Agency".into(),
        ..Settings::default()
    };
    settings.save(settings_path.to_str().unwrap()).unwrap();

    let mut dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert_eq!(dash.active_tab().name, "Acme Agency");
    assert!(dash.add_widget("quick-stats"));
    assert!(dash.create_tab(Some("Clients")));

    let store = JsonFileStore::new(dir.path().join("state").join("dashboard.json"));
    let saved = store.load().unwrap().expect("state saved");
    assert_eq!(&saved, dash.state());

    let reopened = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert_eq!(reopened.state(), dash.state());
    assert_eq!(reopened.state().active_tab_id(), "clients");
}

#[test]
fn templates_file_is_created_and_layered_over_builtins() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let settings = Settings {
        templates_file: Some("templates.json".into()),
        ..Settings::default()
    };
    let dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    let templates_path = dir.path().join("templates.json");
    assert_eq!(std::fs::read_to_string(&templates_path).unwrap(), "[]\n");
    assert!(dash.templates().get("agency-overview").is_some());
    drop(dash);

    std::fs::write(
        &templates_path,
        r#"[{"id":"launch","name":"Launch Week","layout":[
            {"id":"campaign-timeline","widgetId":"campaign-timeline","x":0,"y":0,"w":12,"h":1},
            {"id":"pending-approvals","widgetId":"pending-approvals","x":0,"y":1,"w":4,"h":1}
        ]}]"#,
    )
    .unwrap();
    let mut dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert!(dash.apply_template("launch", ApplyMode::NewTab));
    assert_eq!(dash.active_tab().id, "launch-week");
    assert_eq!(dash.active_tab().layout.len(), 2);
}

#[test]
fn custom_catalog_file_replaces_builtin_widgets() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    std::fs::write(
        dir.path().join("catalog.json"),
        r#"{"pipeline":{"title":"Pipeline","category":"Sales","defaultSpan":5}}"#,
    )
    .unwrap();
    let settings = Settings {
        catalog_file: Some("catalog.json".into()),
        ..Settings::default()
    };
    let mut dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert_eq!(dash.catalog().len(), 1);
    assert!(!dash.add_widget("quick-stats"));
    assert!(dash.add_widget("pipeline"));
    assert_eq!(dash.active_tab().widget("pipeline").map(|w| w.w), Some(5));
}

#[test]
fn corrupt_state_file_starts_fresh() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    std::fs::write(dir.path().join("dashboard.json"), "{\"tabs\": 7}").unwrap();
    let dash = Dashboard::from_settings(&Settings::default(), &settings_path, None).unwrap();
    assert_eq!(dash.state().tabs().len(), 1);
    assert!(dash.active_tab().layout.is_empty());
}

#[test]
fn sanitizes_hand_edited_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dashboard.json");
    std::fs::write(
        &path,
        r#"{"tabs":[{"id":"main","name":"Main","layout":[
            {"id":"quick-stats","widgetId":"quick-stats","x":0,"y":0,"w":3,"h":1},
            {"id":"quick-stats","widgetId":"quick-stats","x":3,"y":0,"w":3,"h":1},
            {"id":"revenue-chart","widgetId":"revenue-chart","x":9,"y":0,"w":6,"h":1}
        ]}],"activeTabId":"missing"}"#,
    )
    .unwrap();
    let state = JsonFileStore::new(&path).load().unwrap().expect("state");
    assert_eq!(state.active_tab_id(), "main");
    assert_eq!(state.active_tab().layout.len(), 1);
    assert_eq!(state.active_tab().layout[0].x, 0);
}

#[test]
fn saved_templates_survive_a_restart() {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let settings = Settings {
        templates_file: Some("templates.json".into()),
        ..Settings::default()
    };

    let mut dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert!(dash.add_widget("quick-stats"));
    assert!(dash.add_widget("top-influencers"));
    let id = dash
        .save_active_tab_as_template("My Mix")
        .map(|t| t.id.clone())
        .unwrap();
    drop(dash);

    let mut dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert!(dash.templates().get(&id).is_some());
    assert!(dash.apply_template(&id, ApplyMode::NewTab));
    assert_eq!(dash.active_tab().layout.len(), 2);

    assert!(dash.remove_template(&id));
    drop(dash);
    let dash = Dashboard::from_settings(&settings, &settings_path, None).unwrap();
    assert!(dash.templates().get(&id).is_none());
    assert!(dash.templates().get("agency-overview").is_some());
}
