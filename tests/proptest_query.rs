//! Property-based tests using proptest
//!
//! These tests cover query string encoding, optional-field serialization
//! and envelope decoding with randomized inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use vultr_registry::{
    encode_query, with_query, DockerCredentialsOptions, ListOptions, Meta, Page, QueryParams,
    UpdateRegistryRequest, UpdateRepositoryRequest,
};

/// Split an encoded query back into decoded pairs
fn decode_pairs(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }
    query
        .split('&')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap();
            (
                urlencoding::decode(key).unwrap().into_owned(),
                urlencoding::decode(value).unwrap().into_owned(),
            )
        })
        .collect()
}

fn arb_list_options() -> impl Strategy<Value = ListOptions> {
    (
        prop::option::of(1u32..500),
        prop::option::of("[ -~]{1,40}"),
    )
        .prop_map(|(per_page, cursor)| ListOptions { per_page, cursor })
}

/// Generate a repository as the API returns it
fn arb_repository() -> impl Strategy<Value = Value> {
    ("[a-z][a-z0-9-]{0,30}", 0u64..100_000, 0u64..50).prop_map(|(name, pulls, artifacts)| {
        json!({
            "name": name,
            "image": format!("ewr.vultrcr.com/reg/{}", name),
            "description": "",
            "added_at": "2024-01-01 00:00:00",
            "updated_at": "2024-01-01 00:00:00",
            "pull_count": pulls,
            "artifact_count": artifacts
        })
    })
}

proptest! {
    /// Absent options never produce keys
    #[test]
    fn list_options_emit_only_present_keys(options in arb_list_options()) {
        let pairs = decode_pairs(&encode_query(&options.query_pairs()));
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();

        prop_assert_eq!(keys.contains(&"per_page"), options.per_page.is_some());
        prop_assert_eq!(keys.contains(&"cursor"), options.cursor.is_some());
    }

    /// Values survive percent-encoding unchanged
    #[test]
    fn cursor_round_trips_through_encoding(cursor in "[ -~]{1,60}") {
        let options = ListOptions::new().with_cursor(cursor.clone());
        let pairs = decode_pairs(&encode_query(&options.query_pairs()));

        prop_assert_eq!(pairs, vec![("cursor".to_string(), cursor)]);
    }

    /// A path never gains a dangling `?`
    #[test]
    fn with_query_appends_only_when_needed(options in arb_list_options()) {
        let url = with_query("/v2/registries", &options);

        if options.per_page.is_none() && options.cursor.is_none() {
            prop_assert_eq!(url, "/v2/registries");
        } else {
            prop_assert!(url.starts_with("/v2/registries?"));
            prop_assert!(!url.ends_with('?'));
        }
    }

    /// The write flag is sent as `read_write`
    #[test]
    fn credential_options_map_to_wire_names(
        expiry in prop::option::of(0u64..86_400 * 365),
        write in prop::option::of(any::<bool>()),
    ) {
        let options = DockerCredentialsOptions { expiry_seconds: expiry, write_access: write };
        let pairs = options.query_pairs();

        let read_write = pairs.iter().find(|(k, _)| *k == "read_write").map(|(_, v)| v.clone());
        let expiry_seconds = pairs.iter().find(|(k, _)| *k == "expiry_seconds").map(|(_, v)| v.clone());

        prop_assert_eq!(read_write, write.map(|w| w.to_string()));
        prop_assert_eq!(expiry_seconds, expiry.map(|e| e.to_string()));
        prop_assert!(pairs.iter().all(|(k, _)| *k != "write_access"));
    }

    /// Update payloads omit unset fields instead of sending null
    #[test]
    fn registry_update_never_serializes_null(
        public in prop::option::of(any::<bool>()),
        plan in prop::option::of(prop_oneof!["start_up", "business", "premium", "enterprise"]),
    ) {
        let patch = UpdateRegistryRequest { public, plan: plan.clone() };
        let body = serde_json::to_value(&patch).unwrap();
        let map = body.as_object().unwrap();

        prop_assert_eq!(map.contains_key("public"), public.is_some());
        prop_assert_eq!(map.contains_key("plan"), plan.is_some());
        prop_assert!(map.values().all(|v| !v.is_null()));
        prop_assert_eq!(patch.is_empty(), map.is_empty());
    }

    #[test]
    fn repository_update_never_serializes_null(description in prop::option::of(".{0,80}")) {
        let patch = UpdateRepositoryRequest { description: description.clone() };
        let body = serde_json::to_value(&patch).unwrap();

        match description {
            Some(text) => prop_assert_eq!(body, json!({"description": text})),
            None => prop_assert_eq!(body, json!({})),
        }
    }

    /// Every item in the envelope is decoded, in order
    #[test]
    fn envelope_preserves_items(
        items in prop::collection::vec(arb_repository(), 0..50),
        next in prop::option::of("[A-Za-z0-9]{1,24}"),
    ) {
        let body = json!({
            "repositories": items,
            "meta": {
                "total": items.len(),
                "links": {"next": next.clone().unwrap_or_default(), "prev": ""}
            }
        });

        let page: Page<vultr_registry::Repository> =
            Page::from_envelope(body, "repositories").unwrap();

        prop_assert_eq!(page.len(), items.len());
        prop_assert_eq!(page.meta.total, items.len() as u64);
        prop_assert_eq!(page.next_cursor(), next.as_deref());
        for (decoded, raw) in page.items.iter().zip(&items) {
            prop_assert_eq!(&decoded.name, raw["name"].as_str().unwrap());
        }
    }

    /// Following a page continues with its cursor and keeps the page size
    #[test]
    fn next_page_follows_links(
        options in arb_list_options(),
        next in prop::option::of("[A-Za-z0-9]{1,24}"),
    ) {
        let meta: Meta = serde_json::from_value(json!({
            "total": 10,
            "links": {"next": next.clone().unwrap_or_default(), "prev": ""}
        }))
        .unwrap();

        match options.next_page(&meta) {
            Some(following) => {
                prop_assert_eq!(following.cursor, next);
                prop_assert_eq!(following.per_page, options.per_page);
            }
            None => prop_assert!(next.is_none()),
        }
    }
}
