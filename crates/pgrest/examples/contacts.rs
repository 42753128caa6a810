//! Contact listing and lead-state upsert against a live project.
//!
//! Run with `SUPABASE_URL` and `SUPABASE_SERVICE_ROLE_KEY` set (a `.env` file
//! works too):
//!
//! ```text
//! cargo run --example contacts -- <pipeline_id> <stage_id> [search]
//! ```

use pgrest::{IsValue, Predicate, RestClient, RestResponse, RestResult, TracingRequestHook};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Contact {
    id: i64,
    first_name: String,
    last_name: String,
    email: Option<String>,
}

#[tokio::main]
async fn main() -> RestResult<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let pipeline_id: i64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let stage_id: i64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let search = args.next();

    let client = RestClient::from_env()?.with_hook(TracingRequestHook::new());

    let mut query = client
        .from("crm_contacts")
        .select("id,first_name,last_name,email")
        .order_desc("created_at")
        .limit(20);
    if let Some(q) = &search {
        let pattern = format!("%{q}%");
        query = query.or_where(&[
            Predicate::ilike("first_name", &pattern),
            Predicate::ilike("last_name", &pattern),
            Predicate::ilike("email", &pattern),
        ]);
    }
    let contacts: Vec<Contact> = query.fetch().await?;
    println!("{} contact(s)", contacts.len());
    for c in &contacts {
        println!(
            "  #{:<5} {} {} <{}>",
            c.id,
            c.first_name,
            c.last_name,
            c.email.as_deref().unwrap_or("-")
        );
    }

    let unowned = client
        .from("crm_contacts")
        .select("id")
        .is("owner_user_id", IsValue::Null)
        .limit(1)
        .execute()
        .await?;
    println!("unowned sample: {unowned:?}");

    let Some(first) = contacts.first() else {
        return Ok(());
    };

    // One round trip, resolved by the store: no read-then-write race.
    let resp = client
        .from("crm_lead_state")
        .upsert(json!({
            "contact_id": first.id,
            "pipeline_id": pipeline_id,
            "stage_id": stage_id,
        }))
        .on_conflict("contact_id")
        .select("contact_id,stage_id,status")
        .single()
        .execute()
        .await?;

    match resp {
        RestResponse::Row(row) => println!("lead state: {row}"),
        RestResponse::Failure(f) => eprintln!("upsert failed: {f}"),
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
