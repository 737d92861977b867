//! Tests for candidate collection, visibility gating, reference allocation
//! and snapshot rendering, using a mock driver in place of a real browser.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::init_tracing;
use crate::errors::{DriverError, SnapshotError};
use crate::query::{LocatorQuery, UiDriver};
use crate::snapshot::{annotate_tree, create_snapshot};
use crate::tree::{parse_snapshot_text, render_text};

/// Reports every element visible except those whose query string is listed.
struct VisibilityStub {
    hidden: Vec<String>,
}

impl VisibilityStub {
    fn all_visible() -> Self {
        VisibilityStub { hidden: Vec::new() }
    }

    fn hiding(queries: &[&str]) -> Self {
        VisibilityStub {
            hidden: queries.iter().map(|q| q.to_string()).collect(),
        }
    }
}

#[async_trait]
impl UiDriver for VisibilityStub {
    async fn is_visible(&self, query: &LocatorQuery) -> Result<bool, DriverError> {
        Ok(!self.hidden.contains(&query.to_string()))
    }
}

/// A driver whose queries always fail, as a flaky page would.
struct FailingDriver;

#[async_trait]
impl UiDriver for FailingDriver {
    async fn is_visible(&self, _query: &LocatorQuery) -> Result<bool, DriverError> {
        Err(DriverError("element handle went away".to_string()))
    }
}

#[tokio::test]
async fn every_visible_candidate_gets_a_distinct_token() {
    init_tracing();
    let tree = json!({
        "navigation": {"link \"Home\"": "/home", "link \"Docs\"": "/docs"},
        "main": {"button \"Submit\"": "x"}
    });
    let mapping = create_snapshot(&tree, &VisibilityStub::all_visible())
        .await
        .unwrap();

    // navigation, two links, main, button
    assert_eq!(mapping.entries.len(), 5);
    assert_eq!(mapping.references.len(), 5);
    let tokens: HashSet<&String> = mapping.references.keys().collect();
    assert_eq!(tokens.len(), 5);
}

#[tokio::test]
async fn hidden_candidates_are_dropped_and_rendered_without_refs() {
    init_tracing();
    let tree = json!([{"button": {}}, {"button": {}}]);
    let driver = VisibilityStub::hiding(&["role=button[nth=1]"]);
    let mapping = create_snapshot(&tree, &driver).await.unwrap();

    assert_eq!(mapping.entries.len(), 1);
    assert_eq!(mapping.references.len(), 1);
    assert_eq!(mapping.entries[0].query.nth, Some(0));
    // Exactly one of the two structurally identical lines is annotated.
    assert_eq!(mapping.rendered_text.matches("[ref=").count(), 1);
}

#[tokio::test]
async fn driver_failures_are_treated_as_hidden() {
    init_tracing();
    let tree = json!({"button \"Save\"": "x", "link \"Home\"": "/home"});
    let mapping = create_snapshot(&tree, &FailingDriver).await.unwrap();

    assert!(mapping.entries.is_empty());
    assert!(mapping.references.is_empty());
    assert!(!mapping.rendered_text.contains("[ref="));
}

#[tokio::test]
async fn unknown_reference_lookup_is_a_hard_error() {
    init_tracing();
    let tree = json!({"button \"Save\"": "x"});
    let mapping = create_snapshot(&tree, &VisibilityStub::all_visible())
        .await
        .unwrap();

    let error = mapping.query_for("zzzzzz").unwrap_err();
    assert!(matches!(error, SnapshotError::UnknownReference(_)));
}

#[tokio::test]
async fn issued_tokens_resolve_back_to_their_query() {
    init_tracing();
    let text = "navigation:\n  link \"Home\": /home\nmain:\n  textbox \"Search models\": value\n";
    let tree = parse_snapshot_text(text).unwrap();
    let mapping = create_snapshot(&tree, &VisibilityStub::all_visible())
        .await
        .unwrap();

    let (token, query) = mapping
        .references
        .iter()
        .find(|(_, q)| q.role == "textbox")
        .expect("textbox got a token");
    assert_eq!(query.name.as_deref(), Some("Search models"));
    assert_eq!(query.parent.as_ref().unwrap().role, "main");
    assert!(mapping.rendered_text.contains(&format!("[ref={token}]")));
    assert!(mapping.query_for(token).is_ok());
}

#[tokio::test]
async fn deduplicated_occurrences_each_get_their_own_token() {
    init_tracing();
    // Two identical role lines collapse to one query, but every occurrence
    // must carry its own token so an action on either is unambiguous.
    let tree = json!([{"link \"Home\"": "/home"}, {"link \"Home\"": "/home"}]);
    let mapping = create_snapshot(&tree, &VisibilityStub::all_visible())
        .await
        .unwrap();

    assert_eq!(mapping.entries.len(), 1);
    assert_eq!(mapping.references.len(), 2);
    assert_eq!(mapping.rendered_text.matches("[ref=").count(), 2);
    let queries: Vec<&Arc<LocatorQuery>> = mapping.references.values().collect();
    assert_eq!(queries[0], queries[1]);
}

#[tokio::test]
async fn scalar_root_fails_the_request() {
    init_tracing();
    let result = create_snapshot(&json!("bare text"), &VisibilityStub::all_visible()).await;
    assert!(matches!(result, Err(SnapshotError::MalformedTree { .. })));
}

#[test]
fn rendering_with_no_tokens_is_the_identity() {
    init_tracing();
    let tree = json!({
        "navigation": {"link \"Home\"": "/home"},
        "/url": "https://example.com",
        "list": ["separator", {"button \"Go\"": "x"}]
    });
    let annotated = annotate_tree(&tree, &HashMap::new());
    assert_eq!(annotated, tree);
    assert_eq!(
        render_text(&annotated).unwrap(),
        render_text(&tree).unwrap()
    );
}

#[tokio::test]
async fn filtering_then_mapping_compose() {
    init_tracing();
    let text = concat!(
        "main:\n",
        "  list:\n",
        "    - link \"Pricing\": pricing page\n",
        "    - link \"About\": about page\n",
        "banner:\n",
        "  heading \"Welcome\": w\n",
    );
    let tree = parse_snapshot_text(text).unwrap();
    let filtered = crate::filter::filter_snapshot(&tree, &["pricing".to_string()], 0.3);
    let mapping = create_snapshot(&filtered, &VisibilityStub::all_visible())
        .await
        .unwrap();

    assert!(mapping
        .references
        .values()
        .any(|q| q.name.as_deref() == Some("Pricing")));
    assert!(!mapping.rendered_text.contains("Welcome"));
}
