//! Request compilation tests for the qb module.

use crate::qb::{IsValue, Operation, Predicate, SingleRowMode};
use crate::{RestClient, RestConfig, RestError};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

fn client() -> RestClient {
    RestClient::new(RestConfig::new("https://abc.supabase.co", "test-key")).unwrap()
}

fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
    list.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_select_defaults_to_star() {
    let req = client().from("crm_accounts").build_request().unwrap();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.url.path(), "/rest/v1/crm_accounts");
    assert_eq!(req.query_pairs(), pairs(&[("select", "*")]));
    assert!(req.body.is_none());
    assert!(req.header("prefer").is_none());
    assert!(req.header("accept").is_none());
}

#[test]
fn test_select_chain_encodes_exact_params() {
    let req = client()
        .from("t")
        .select("id,name")
        .eq("active", true)
        .order("name")
        .limit(10)
        .build_request()
        .unwrap();

    assert_eq!(
        req.query_pairs(),
        pairs(&[
            ("select", "id,name"),
            ("active", "eq.true"),
            ("order", "name.asc"),
            ("limit", "10"),
        ])
    );
}

#[test]
fn test_equality_filters_one_entry_per_column() {
    let req = client()
        .from("crm_contacts")
        .eq("account_id", 3)
        .eq("owner_user_id", 9)
        .eq("account_id", 4)
        .build_request()
        .unwrap();

    let eqs: Vec<_> = req
        .query_pairs()
        .into_iter()
        .filter(|(_, v)| v.starts_with("eq."))
        .collect();
    assert_eq!(
        eqs,
        pairs(&[("account_id", "eq.4"), ("owner_user_id", "eq.9")])
    );
}

#[test]
fn test_eq_opt_skips_none() {
    let qb = client()
        .from("crm_contacts")
        .eq_opt("account_id", None::<i64>)
        .eq_opt("owner_user_id", Some(5));
    assert_eq!(qb.filters().get("account_id"), None);
    assert_eq!(qb.filters().get("owner_user_id"), Some("eq.5"));
}

#[test]
fn test_order_direction() {
    let qb = client().from("t").order("created_at");
    assert_eq!(qb.filters().get("order"), Some("created_at.asc"));

    let qb = qb.order_desc("created_at");
    assert_eq!(qb.filters().get("order"), Some("created_at.desc"));

    let qb = qb.order_by("sort_order", true);
    assert_eq!(qb.filters().get("order"), Some("sort_order.asc"));
}

#[test]
fn test_contains_encoding() {
    let qb = client().from("crm_contacts").contains("tags", Vec::<String>::new());
    assert_eq!(qb.filters().get("tags"), Some("cs.{}"));

    let qb = qb.contains("tags", ["vip", "kingston"]);
    assert_eq!(qb.filters().get("tags"), Some("cs.{vip,kingston}"));

    let qb = qb.contains("tags", ["a,b"]);
    assert_eq!(qb.filters().get("tags"), Some(r#"cs.{"a,b"}"#));
}

#[test]
fn test_comparison_operators() {
    let qb = client()
        .from("crm_lead_state")
        .neq("status", "lost")
        .gte("next_follow_up_at", "2026-01-01")
        .lt("score", 10)
        .ilike("company", "%acme%")
        .is("archived_at", IsValue::Null)
        .in_list("stage_id", [1, 2, 3]);

    let f = qb.filters();
    assert_eq!(f.get("status"), Some("neq.lost"));
    assert_eq!(f.get("next_follow_up_at"), Some("gte.2026-01-01"));
    assert_eq!(f.get("score"), Some("lt.10"));
    assert_eq!(f.get("company"), Some("ilike.%acme%"));
    assert_eq!(f.get("archived_at"), Some("is.null"));
    assert_eq!(f.get("stage_id"), Some("in.(1,2,3)"));
}

#[test]
fn test_raw_or_is_verbatim() {
    let qb = client()
        .from("crm_users")
        .or("username.eq.ann,email.eq.ann@example.com");
    assert_eq!(
        qb.filters().get("or"),
        Some("(username.eq.ann,email.eq.ann@example.com)")
    );
}

#[test]
fn test_or_where_quotes_values() {
    let q = "smith, john";
    let qb = client().from("crm_contacts").or_where(&[
        Predicate::ilike("first_name", format!("%{q}%")),
        Predicate::ilike("last_name", format!("%{q}%")),
    ]);
    assert_eq!(
        qb.filters().get("or"),
        Some(r#"(first_name.ilike."%smith, john%",last_name.ilike."%smith, john%")"#)
    );

    let qb = qb.or_where(&[
        Predicate::eq("owner_user_id", 7),
        Predicate::is("owner_user_id", IsValue::Null),
    ]);
    assert_eq!(
        qb.filters().get("or"),
        Some("(owner_user_id.eq.7,owner_user_id.is.null)")
    );
}

#[test]
fn test_insert_request() {
    let req = client()
        .from("crm_notes")
        .insert(json!({"contact_id": 1, "note": "called"}))
        .select("*")
        .single()
        .build_request()
        .unwrap();

    assert_eq!(req.method, Method::POST);
    assert_eq!(req.operation, Operation::Insert);
    assert_eq!(req.mode, SingleRowMode::Strict);
    assert_eq!(req.header("prefer"), Some("return=representation"));
    assert_eq!(req.header("accept"), Some("application/vnd.pgrst.object+json"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("apikey"), Some("test-key"));
    assert_eq!(req.header("authorization"), Some("Bearer test-key"));
    assert_eq!(req.body_json(), Some(json!({"contact_id": 1, "note": "called"})));
    assert_eq!(req.query_pairs(), pairs(&[("select", "*")]));
}

#[test]
fn test_update_request() {
    #[derive(Serialize)]
    struct StatusPatch<'a> {
        status: &'a str,
    }

    let req = client()
        .from("crm_lead_state")
        .update(StatusPatch { status: "won" })
        .eq("contact_id", 42)
        .build_request()
        .unwrap();

    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.header("prefer"), Some("return=representation"));
    assert!(req.header("accept").is_none());
    assert_eq!(req.body_json(), Some(json!({"status": "won"})));
    assert_eq!(
        req.query_pairs(),
        pairs(&[("contact_id", "eq.42"), ("select", "*")])
    );
}

#[test]
fn test_upsert_request() {
    let req = client()
        .from("crm_lead_state")
        .upsert(json!({"contact_id": 42, "stage_id": 3}))
        .on_conflict("contact_id")
        .build_request()
        .unwrap();

    assert_eq!(req.method, Method::POST);
    assert_eq!(
        req.header("prefer"),
        Some("resolution=merge-duplicates,return=representation")
    );
    assert_eq!(
        req.query_pairs(),
        pairs(&[("on_conflict", "contact_id"), ("select", "*")])
    );
}

#[test]
fn test_later_mutation_overrides_earlier() {
    let qb = client()
        .from("crm_accounts")
        .insert(json!({"name": "A"}))
        .update(json!({"name": "B"}));
    assert_eq!(qb.operation(), Operation::Update);
    assert_eq!(qb.payload(), Some(&json!({"name": "B"})));
}

#[test]
fn test_scalar_payload_is_rejected() {
    let qb = client().from("crm_accounts").insert(5);
    let err = qb.build_request().unwrap_err();
    assert!(matches!(err, RestError::Serialization(_)));
}

#[test]
fn test_maybe_single_sets_accept() {
    let qb = client().from("crm_accounts").eq("name", "Acme").maybe_single();
    assert_eq!(qb.mode(), SingleRowMode::Maybe);
    let req = qb.build_request().unwrap();
    assert_eq!(req.header("accept"), Some("application/vnd.pgrst.object+json"));
}

#[test]
fn test_values_are_url_escaped() {
    let req = client()
        .from("crm_contacts")
        .eq("email", "a+b@example.com")
        .build_request()
        .unwrap();
    assert!(req.url.query().unwrap().contains("email=eq.a%2Bb%40example.com"));
    assert_eq!(
        req.query_pairs(),
        pairs(&[("email", "eq.a+b@example.com"), ("select", "*")])
    );
}
