mod common;

use common::{MockTransport, Request, catalog_server};
use genesis_client::cli::commands;
use genesis_client::client::{ApiError, Body};
use genesis_client::models::{
    DownloadData, Language, NewSnippet, ObfuscatorProfile, SnippetAlteration, StatusMessage,
    Technique,
};
use genesis_client::store::getters;
use genesis_client::{Action, Mutation, Store};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn store_with(mock: &Arc<MockTransport>) -> Store {
    Store::new(mock.clone())
}

/// Lets detached retrieval tasks run to completion.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn retrieved_snippets_are_keyed_by_id() {
    let mock = Arc::new(MockTransport::new());
    mock.json(
        "/snippets",
        json!([
            {"id": "a", "title": "A"},
            {"id": "b", "title": "B"},
            {"id": "c", "title": "C"}
        ]),
    );
    let store = store_with(&mock);

    store.retrieve_snippets().await.unwrap();

    store.read(|state| {
        let snippets = getters::snippets(state);
        assert_eq!(snippets.len(), 3);
        let ids: HashSet<_> = snippets.keys().map(String::as_str).collect();
        assert_eq!(ids, HashSet::from(["a", "b", "c"]));
        for (id, snippet) in snippets {
            assert_eq!(&snippet.id, id);
        }
        assert_eq!(snippets["b"].title, "B");
    });
}

#[tokio::test]
async fn retrieving_snippets_twice_replaces_rather_than_accumulates() {
    let mock = Arc::new(catalog_server());
    let store = store_with(&mock);

    store.retrieve_snippets().await.unwrap();
    let once = store.snapshot();
    store.retrieve_snippets().await.unwrap();

    assert_eq!(store.snapshot(), once);
}

#[tokio::test]
async fn current_snippet_scenario() {
    let store = store_with(&Arc::new(MockTransport::new()));
    store.read(|state| {
        assert!(getters::snippets(state).is_empty());
        assert_eq!(getters::current_snippet_id(state), "");
        assert!(getters::current_snippet(state).is_none());
    });

    let snippets = serde_json::from_value(json!([
        {"id": "a", "title": "first"},
        {"id": "b", "title": "second"}
    ]))
    .unwrap();
    store.commit(Mutation::SetSnippets(snippets));
    assert_eq!(store.read(|state| state.snippets.len()), 2);

    store.select_snippet("b");
    let current = store.read(|state| getters::current_snippet(state).cloned());
    assert_eq!(current.map(|s| s.title), Some("second".to_string()));

    store.select_snippet("z");
    assert!(store.read(|state| getters::current_snippet(state).is_none()));
}

#[tokio::test]
async fn retrieve_all_populates_the_store() {
    let mock = Arc::new(catalog_server());
    let store = store_with(&mock);

    store.dispatch(Action::RetrieveAll).await.unwrap();

    let state = store.snapshot();
    assert_eq!(getters::languages(&state).len(), 3);
    assert_eq!(getters::techniques(&state), &[Technique::from("Scripting"), Technique::from("UserExecution")]);
    assert_eq!(getters::architectures(&state).len(), 2);
    assert_eq!(getters::snippets(&state).len(), 2);
    assert_eq!(getters::status_technique_count(&state), Some(&StatusMessage::new("2")));
    assert_eq!(getters::status_top_language(&state), Some(&StatusMessage::new("VBA")));
    assert_eq!(getters::status_version(&state), Some(&StatusMessage::new("1.0-stable")));
    assert_eq!(getters::status_snippets(&state), Some(&StatusMessage::new("2")));
    assert!(getters::error(&state).is_none());

    let gets = mock.requests().iter().filter(|r| r.method == "GET").count();
    assert_eq!(gets, 8);
}

#[tokio::test]
async fn retrieve_all_waits_for_the_slowest_retrieval() {
    let mock = Arc::new(catalog_server());
    mock.json_after(
        "/status/version",
        json!({"message": "2.0"}),
        Duration::from_millis(30),
    );
    let store = store_with(&mock);

    store.retrieve_all().await.unwrap();

    assert_eq!(
        store.read(|state| getters::status_version(state).cloned()),
        Some(StatusMessage::new("2.0"))
    );
}

#[tokio::test]
async fn retrieve_all_rejects_with_the_failing_branch_and_keeps_the_rest() {
    let mock = Arc::new(catalog_server());
    mock.json("/status/version", json!({"error": "X"}));
    let store = store_with(&mock);

    let result = store.retrieve_all().await;
    settle().await;

    assert_eq!(result, Err(ApiError::Application("X".into())));
    let state = store.snapshot();
    assert_eq!(getters::error(&state), Some(&ApiError::Application("X".into())));
    assert!(getters::status_version(&state).is_none());
    assert_eq!(getters::languages(&state).len(), 3);
    assert_eq!(getters::techniques(&state).len(), 2);
    assert_eq!(getters::architectures(&state).len(), 2);
    assert_eq!(getters::snippets(&state).len(), 2);
    assert!(getters::status_technique_count(&state).is_some());
    assert!(getters::status_top_language(&state).is_some());
    assert!(getters::status_snippets(&state).is_some());
}

#[tokio::test]
async fn retrieve_all_rejects_before_slow_siblings_commit() {
    let mock = Arc::new(catalog_server());
    mock.json("/techniques", json!({"error": "X"}));
    mock.json_after(
        "/status/version",
        json!({"message": "late"}),
        Duration::from_millis(200),
    );
    let store = store_with(&mock);

    let started = tokio::time::Instant::now();
    let result = store.retrieve_all().await;

    assert_eq!(result, Err(ApiError::Application("X".into())));
    assert!(started.elapsed() < Duration::from_millis(200));
    assert!(store.read(|state| getters::status_version(state).is_none()));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        store.read(|state| getters::status_version(state).cloned()),
        Some(StatusMessage::new("late"))
    );
    assert_eq!(
        store.read(|state| state.error.clone()),
        Some(ApiError::Application("X".into()))
    );
}

#[tokio::test]
async fn error_envelopes_reject_every_retrieval() {
    let cases = [
        ("/snippets/languages", Action::RetrieveLanguages),
        ("/techniques", Action::RetrieveTechniques),
        ("/snippets/architectures", Action::RetrieveArchitectures),
        ("/snippets", Action::RetrieveSnippets),
        ("/status/techniqueCount", Action::RetrieveStatusTechniqueCount),
        ("/status/topLanguage", Action::RetrieveStatusTopLanguage),
        ("/status/version", Action::RetrieveStatusVersion),
        ("/status/snippets", Action::RetrieveStatusSnippets),
        ("/status/topTechnique", Action::RetrieveStatusTopTechnique),
        ("/tactics", Action::RetrieveTactics),
    ];

    for (path, action) in cases {
        let mock = Arc::new(MockTransport::new());
        mock.json(path, json!({"error": "X"}));
        let store = store_with(&mock);

        let result = store.dispatch(action.clone()).await;

        assert_eq!(result, Err(ApiError::Application("X".into())), "{action:?}");
        assert_eq!(
            store.read(|state| state.error.clone()),
            Some(ApiError::Application("X".into())),
            "{action:?}"
        );
        assert_eq!(result.unwrap_err().to_string(), "X");
    }
}

#[tokio::test]
async fn transport_failures_are_recorded_and_returned() {
    let mock = Arc::new(MockTransport::new());
    let refused = ApiError::Transport("connection refused".into());
    mock.fail("/techniques", refused.clone());
    let store = store_with(&mock);

    assert_eq!(store.retrieve_techniques().await, Err(refused.clone()));
    assert_eq!(store.read(|state| state.error.clone()), Some(refused));
    assert!(store.read(|state| state.techniques.is_empty()));
}

#[tokio::test]
async fn malformed_payloads_are_decode_errors() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/snippets", json!({"unexpected": true}));
    let store = store_with(&mock);

    let err = store.retrieve_snippets().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(store.read(|state| state.error.clone()), Some(err));
}

#[tokio::test]
async fn later_errors_overwrite_earlier_ones() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/techniques", json!({"error": "first"}))
        .json("/snippets/languages", json!({"error": "second"}));
    let store = store_with(&mock);

    let _ = store.retrieve_techniques().await;
    let _ = store.retrieve_languages().await;

    assert_eq!(
        store.read(|state| state.error.clone()),
        Some(ApiError::Application("second".into()))
    );
}

#[tokio::test]
async fn new_snippet_payload_is_copied_before_sending() {
    let mock = Arc::new(MockTransport::new());
    mock.body("/snippets/create", Body::Empty);
    let store = store_with(&mock);

    let mut payload = NewSnippet::new("Dropper", "VBA");
    payload.class.architecture = "WINDOWS".into();
    payload.class.techniques.push("Scripting".into());
    payload.class.script = "Shell \"calc\"".into();
    let revision = store.revision();

    store.add_new_snippet(&payload).await.unwrap();
    payload.information.title = "Changed afterwards".into();
    payload.class.techniques.push("UserExecution".into());

    let expected = json!({
        "information": {"title": "Dropper", "description": "", "author": "", "date": ""},
        "class": {
            "language": "VBA",
            "architecture": "WINDOWS",
            "techniques": ["Scripting"],
            "script": "Shell \"calc\"",
            "variables": {}
        }
    });

    let requests = mock.requests();
    assert_eq!(
        requests,
        vec![Request {
            method: "POST",
            path: "/snippets/create".into(),
            body: Some(expected),
        }]
    );
    assert_eq!(store.revision(), revision);
}

#[tokio::test]
async fn rejected_new_snippet_records_the_error() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/snippets/create", json!({"error": "Snippet already exists"}));
    let store = store_with(&mock);

    let result = store
        .dispatch(Action::AddNewSnippet(NewSnippet::default()))
        .await;

    let expected = ApiError::Application("Snippet already exists".into());
    assert_eq!(result, Err(expected.clone()));
    assert_eq!(store.read(|state| state.error.clone()), Some(expected));
}

#[tokio::test]
async fn builds_are_stored_as_download_data() {
    let mock = Arc::new(MockTransport::new());
    mock.body("/build", Body::Text("Sub AutoOpen()\nEnd Sub\n".into()));
    let store = store_with(&mock);

    let alteration = SnippetAlteration::new("a").with_profile(ObfuscatorProfile::Medium);
    store
        .dispatch(Action::CreateSnippet(alteration))
        .await
        .unwrap();

    assert_eq!(
        store.read(|state| getters::download_data(state).clone()),
        DownloadData::Text("Sub AutoOpen()\nEnd Sub\n".into())
    );
    let sent = mock.requests().remove(0).body.unwrap();
    assert_eq!(sent, json!({"snippetId": "a", "profile": "MEDIUM", "keyValuePairs": []}));
}

#[tokio::test]
async fn failed_builds_keep_previous_download_data() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(
        "/build",
        ApiError::Status {
            status: 404,
            message: "Cannot find snippet".into(),
        },
    );
    let store = store_with(&mock);
    store.commit(Mutation::SetDownloadData(DownloadData::Text("old".into())));

    assert!(store.create_snippet(&SnippetAlteration::new("x")).await.is_err());
    assert_eq!(
        store.read(|state| state.download_data.clone()),
        DownloadData::Text("old".into())
    );
}

#[tokio::test]
async fn search_sends_base64_keyword_and_stores_results() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/search?keyword=bWFjcm8%3D", json!([{"id": "a", "title": "Macro"}]));
    let store = store_with(&mock);

    store
        .dispatch(Action::SearchSnippets("macro".into()))
        .await
        .unwrap();

    let results = store.read(|state| getters::search_results(state).to_vec());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Macro");
    assert!(store.read(|state| state.snippets.is_empty()));
}

#[tokio::test]
async fn single_snippet_lookups_leave_the_collection_alone() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/snippets/a", json!({"id": "a", "title": "Dropper"}));
    let store = store_with(&mock);

    let snippet = store.retrieve_snippet("a").await.unwrap();

    assert_eq!(snippet.title, "Dropper");
    assert!(store.read(|state| state.snippets.is_empty()));
}

#[tokio::test]
async fn tactics_are_listed_and_expanded() {
    let mock = Arc::new(MockTransport::new());
    mock.json(
        "/tactics",
        json!([{"name": "Execution", "techniques": ["Scripting", "Powershell"]}]),
    )
    .json("/tactics/Execution", json!(["Scripting", "Powershell"]));
    let store = store_with(&mock);

    store.retrieve_tactics().await.unwrap();
    let techniques = store.retrieve_tactic("Execution").await.unwrap();

    let tactics = store.read(|state| getters::tactics(state).to_vec());
    assert_eq!(tactics.len(), 1);
    assert_eq!(tactics[0].name, "Execution");
    assert_eq!(techniques, tactics[0].techniques);
}

#[tokio::test]
async fn reload_issues_a_put() {
    let mock = Arc::new(MockTransport::new());
    mock.body("/snippets", Body::Empty);
    let store = store_with(&mock);

    store.dispatch(Action::ReloadCatalog).await.unwrap();

    assert_eq!(mock.requests()[0].method, "PUT");
    assert!(store.read(|state| state.error.is_none()));
}

#[tokio::test]
async fn subscribers_see_each_commit() {
    let mock = Arc::new(catalog_server());
    let store = store_with(&mock);
    let mut updates = store.subscribe();

    store.retrieve_languages().await.unwrap();

    assert!(updates.has_changed().unwrap());
    assert_eq!(*updates.borrow_and_update(), 1);
    assert_eq!(
        store.read(|state| getters::languages(state).first().cloned()),
        Some(Language::from("VBA"))
    );
}

#[tokio::test]
async fn obfuscator_profiles_are_stored_in_server_order() {
    let mock = Arc::new(MockTransport::new());
    mock.json("/obfuscator/profiles", json!(["NONE", "LOW", "MEDIUM", "HIGH"]));
    let store = store_with(&mock);

    store
        .dispatch(Action::RetrieveObfuscatorProfiles)
        .await
        .unwrap();

    assert_eq!(
        store.read(|state| getters::obfuscator_profiles(state).to_vec()),
        vec![
            ObfuscatorProfile::None,
            ObfuscatorProfile::Low,
            ObfuscatorProfile::Medium,
            ObfuscatorProfile::High,
        ]
    );
}

#[tokio::test]
async fn status_command_reports_a_missing_top_technique() {
    let mock = Arc::new(catalog_server());
    let store = store_with(&mock);

    let result = commands::show_status(&store).await;

    assert!(result.is_err());
    assert!(matches!(
        store.read(|state| state.error.clone()),
        Some(ApiError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn status_command_leaves_no_error_behind() {
    let mock = Arc::new(catalog_server());
    mock.json("/status/topTechnique", json!({"message": "Scripting"}));
    let store = store_with(&mock);

    commands::show_status(&store).await.unwrap();

    let state = store.snapshot();
    assert!(getters::error(&state).is_none());
    assert_eq!(
        getters::status_top_technique(&state),
        Some(&StatusMessage::new("Scripting"))
    );
}
