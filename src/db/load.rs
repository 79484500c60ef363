use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::ledger::Ledger;
use crate::model::GameTime;

/// Load a ledger snapshot into Postgres using COPY FROM STDIN (text format).
///
/// Runs in a single transaction: either every table is loaded or none is.
/// Order respects FK constraints: players → territories → charters →
/// exchanges → bonds → journal_events → journal_effects.
pub async fn load_ledger(pool: &PgPool, ledger: &Ledger) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Players
    {
        let mut buf = String::new();
        for (id, p) in &ledger.players {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                id.get(),
                escape(&p.name),
                escape(&json(&p.resources)?),
                p.delinquency,
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_players.sql"), &buf).await?;
    }

    // Territories
    {
        let mut buf = String::new();
        for (id, t) in &ledger.territories {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                id.get(),
                opt(t.owner.map(|o| o.get())),
                escape(&t.name),
                escape(&t.code),
                t.land_area,
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_territories.sql"), &buf).await?;
    }

    // Charters
    {
        let mut buf = String::new();
        for (id, c) in &ledger.charters {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                id.get(),
                c.territory.get(),
                c.member.get(),
                c.size,
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_charters.sql"), &buf).await?;
    }

    // Exchanges (before bonds, which point back at their origin/payment exchange)
    {
        let mut buf = String::new();
        for (id, ex) in &ledger.exchanges {
            let (offer_turn, offer_day) = date_columns(ex.offer_date);
            let (answer_turn, answer_day) = date_columns(ex.answer_date);
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                id.get(),
                ex.offeror.get(),
                ex.offeree.get(),
                escape(&json(&ex.offeror_side)?),
                escape(&json(&ex.offeree_side)?),
                ex.state.as_str(),
                offer_turn,
                offer_day,
                answer_turn,
                answer_day,
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_exchanges.sql"), &buf).await?;
    }

    // Bonds
    {
        let mut buf = String::new();
        for (id, b) in &ledger.bonds {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                id.get(),
                b.holder.get(),
                b.borrower.get(),
                escape(&json(&b.resources)?),
                opt(b.territory.map(|t| t.get())),
                b.maturity,
                b.age,
                b.state.as_str(),
                opt(b.origin_exchange.map(|e| e.get())),
                opt(b.payment_exchange.map(|e| e.get())),
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_bonds.sql"), &buf).await?;
    }

    // Journal events
    {
        let mut buf = String::new();
        for ev in ledger.journal_events.values() {
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                ev.id.get(),
                ev.kind.as_str(),
                ev.timestamp.turn(),
                ev.timestamp.day(),
                opt(ev.actor.map(|a| a.get())),
                opt(ev.exchange.map(|e| e.get())),
                opt(ev.bond.map(|b| b.get())),
            ));
        }
        copy_in(&mut tx, include_str!("../../sql/copy_journal_events.sql"), &buf).await?;
    }

    // Journal effects, numbered within their event
    {
        let mut buf = String::new();
        let mut seq: BTreeMap<u64, u32> = BTreeMap::new();
        for effect in &ledger.journal_effects {
            let n = seq.entry(effect.event_id.get()).or_default();
            buf.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                effect.event_id.get(),
                n,
                effect.change.change_type_str(),
                escape(&json(&effect.change)?),
            ));
            *n += 1;
        }
        copy_in(&mut tx, include_str!("../../sql/copy_journal_effects.sql"), &buf).await?;
    }

    tx.commit().await?;
    tracing::info!(
        players = ledger.players.len(),
        exchanges = ledger.exchanges.len(),
        bonds = ledger.bonds.len(),
        journal_events = ledger.journal_events.len(),
        "ledger loaded into postgres"
    );
    Ok(())
}

/// Execute a COPY FROM STDIN with the given text-format payload.
async fn copy_in(conn: &mut PgConnection, statement: &str, data: &str) -> Result<(), sqlx::Error> {
    let mut copy = conn.copy_in_raw(statement).await?;
    copy.send(data.as_bytes()).await?;
    copy.finish().await?;
    Ok(())
}

/// Escape a string for Postgres COPY text format.
/// Backslash must be escaped first, then the special whitespace characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Render an optional value as a COPY text value (`\N` for NULL).
fn opt<T: Display>(v: Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "\\N".to_string(),
    }
}

fn date_columns(date: Option<GameTime>) -> (String, String) {
    (opt(date.map(GameTime::turn)), opt(date.map(GameTime::day)))
}

/// Serialize a record for a JSONB column.
fn json<T: Serialize>(val: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(val).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
