use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::ledger::Ledger;

/// A keyed record as written to a table file: the id followed by the
/// record's own fields.
#[derive(Serialize)]
struct Row<'a, K, V> {
    id: K,
    #[serde(flatten)]
    record: &'a V,
}

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn rows<'a, K: Copy, V>(
    table: impl IntoIterator<Item = (&'a K, &'a V)>,
) -> impl Iterator<Item = Row<'a, K, V>>
where
    K: 'a,
    V: 'a,
{
    table.into_iter().map(|(id, record)| Row { id: *id, record })
}

/// Flush the ledger to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 7 files:
/// - `players.jsonl`, `territories.jsonl`, `charters.jsonl`, `bonds.jsonl`,
///   `exchanges.jsonl`: one record per line with its `id` inlined
/// - `journal_events.jsonl`: one JournalEvent per line
/// - `journal_effects.jsonl`: one JournalEffect per line, in commit order
pub fn flush_to_jsonl(ledger: &Ledger, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("players.jsonl"), rows(&ledger.players))?;
    write_jsonl(
        &output_dir.join("territories.jsonl"),
        rows(&ledger.territories),
    )?;
    write_jsonl(&output_dir.join("charters.jsonl"), rows(&ledger.charters))?;
    write_jsonl(&output_dir.join("bonds.jsonl"), rows(&ledger.bonds))?;
    write_jsonl(&output_dir.join("exchanges.jsonl"), rows(&ledger.exchanges))?;
    write_jsonl(
        &output_dir.join("journal_events.jsonl"),
        ledger.journal_events.values(),
    )?;
    write_jsonl(
        &output_dir.join("journal_effects.jsonl"),
        ledger.journal_effects.iter(),
    )?;

    tracing::debug!(dir = %output_dir.display(), "ledger flushed to jsonl");
    Ok(())
}
