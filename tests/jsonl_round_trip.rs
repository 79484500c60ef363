mod common;

use std::collections::BTreeMap;

use common::*;
use iron_blood::flush::flush_to_jsonl;
use iron_blood::*;

const FILES: [&str; 7] = [
    "players.jsonl",
    "territories.jsonl",
    "charters.jsonl",
    "bonds.jsonl",
    "exchanges.jsonl",
    "journal_events.jsonl",
    "journal_effects.jsonl",
];

#[test]
fn flush_produces_valid_jsonl_files() {
    let g = build_active_game();
    let dir = tempfile::tempdir().unwrap();

    flush_to_jsonl(&g.ledger, dir.path()).unwrap();

    for file in FILES {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }

    let count = |file: &str| read_lines(&dir.path().join(file)).len();
    assert_eq!(count("players.jsonl"), 5, "expected 5 players");
    assert_eq!(count("territories.jsonl"), 3, "expected 3 territories");
    assert_eq!(count("charters.jsonl"), 1, "expected 1 charter");
    assert_eq!(count("bonds.jsonl"), 1, "expected 1 bond");
    assert_eq!(count("exchanges.jsonl"), 4, "expected 4 exchanges");
    assert_eq!(count("journal_events.jsonl"), 8, "expected 8 journal events");
    assert_eq!(count("journal_effects.jsonl"), 16, "expected 16 journal effects");

    // Each keyed line carries its id inline alongside the record fields.
    for line in read_lines(&dir.path().join("players.jsonl")) {
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(v.get("id").is_some());
        assert!(v.get("name").is_some());
        assert!(v.get("resources").is_some());
        assert!(v.get("delinquency").is_some());
    }

    for line in read_lines(&dir.path().join("exchanges.jsonl")) {
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(v.get("offeror").is_some());
        assert!(v.get("offeree").is_some());
        assert!(v["state"].is_string());
    }

    for line in read_lines(&dir.path().join("journal_effects.jsonl")) {
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(v.get("event_id").is_some());
        assert!(v["change"]["type"].is_string());
    }
}

#[test]
fn flushed_records_match_the_ledger() {
    let g = build_active_game();
    let dir = tempfile::tempdir().unwrap();
    flush_to_jsonl(&g.ledger, dir.path()).unwrap();

    let bonds = read_lines(&dir.path().join("bonds.jsonl"));
    let bond: serde_json::Value = serde_json::from_str(&bonds[0]).unwrap();
    assert_eq!(bond["holder"], g.lancelot.get());
    assert_eq!(bond["borrower"], g.arthur.get());
    assert_eq!(bond["territory"], g.aglax.get());
    assert_eq!(bond["maturity"], 3);
    assert_eq!(bond["state"], "pending");

    // Exchanges read back into the same records, keyed by id.
    let mut exchanges = BTreeMap::new();
    for line in read_lines(&dir.path().join("exchanges.jsonl")) {
        let mut v: serde_json::Value = serde_json::from_str(&line).unwrap();
        let id: ExchangeId = serde_json::from_value(v["id"].take()).unwrap();
        let record = v.as_object_mut().unwrap();
        record.remove("id");
        let exchange: Exchange = serde_json::from_value(v).unwrap();
        exchanges.insert(id, exchange);
    }
    assert_eq!(exchanges, g.ledger.exchanges);

    let states: Vec<String> = exchanges.values().map(|e| e.state.to_string()).collect();
    assert_eq!(states, vec!["accepted", "waiting", "rejected", "accepted"]);

    // Effects keep commit order.
    let first: JournalEffect =
        serde_json::from_str(&read_lines(&dir.path().join("journal_effects.jsonl"))[0]).unwrap();
    assert_eq!(first, g.ledger.journal_effects[0]);
    assert_eq!(first.change.change_type_str(), "resources_debited");
}

#[test]
fn flush_creates_missing_directories() {
    let g = build_test_game();
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("turn-1").join("ledger");

    flush_to_jsonl(&g.ledger, &nested).unwrap();

    assert_eq!(read_lines(&nested.join("players.jsonl")).len(), 5);
    assert!(read_lines(&nested.join("journal_events.jsonl")).is_empty());
}
