use fairvalue_core::valuation::ValuationEnvelope;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;

/// SQLite-backed audit trail of valuation runs. Persists the full envelope
/// JSON plus summary columns so past runs are retrievable without parsing
/// every payload.
pub struct RunStore {
    conn: Connection,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub request_id: String,
    pub company_name: String,
    pub methodology: String,
    pub as_of_date: String,
    pub fair_value: f64,
    pub generated_at_utc: String,
}

impl RunStore {
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
                request_id       TEXT PRIMARY KEY,
                company_name     TEXT NOT NULL,
                methodology      TEXT NOT NULL,
                as_of_date       TEXT NOT NULL,
                fair_value       REAL NOT NULL,
                generated_at_utc TEXT NOT NULL,
                payload          TEXT NOT NULL
            )",
        )?;
        Ok(Self { conn })
    }

    /// Persists an envelope and returns its request id.
    pub fn save(&self, envelope: &ValuationEnvelope) -> anyhow::Result<String> {
        let result = &envelope.valuation_result;
        let metadata = &envelope.audit_metadata;
        let payload = serde_json::to_string(envelope)?;
        let fair_value = result
            .estimated_fair_value
            .amount
            .to_string()
            .parse::<f64>()
            .unwrap_or(0.0);
        self.conn.execute(
            "INSERT INTO runs (request_id, company_name, methodology, as_of_date,
                               fair_value, generated_at_utc, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                metadata.request_id,
                result.company_name,
                result.methodology,
                result.as_of_date.to_string(),
                fair_value,
                metadata.generated_at_utc.to_rfc3339(),
                payload,
            ],
        )?;
        Ok(metadata.request_id.clone())
    }

    /// Recent runs, newest first. Summary columns only, no payloads.
    pub fn list_runs(&self, limit: usize) -> rusqlite::Result<Vec<RunSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT request_id, company_name, methodology, as_of_date,
                    fair_value, generated_at_utc
             FROM runs ORDER BY rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunSummary {
                request_id: row.get(0)?,
                company_name: row.get(1)?,
                methodology: row.get(2)?,
                as_of_date: row.get(3)?,
                fair_value: row.get(4)?,
                generated_at_utc: row.get(5)?,
            })
        })?;
        rows.collect()
    }

    /// Full stored envelope for a single run, or `None`.
    pub fn get_run(&self, request_id: &str) -> anyhow::Result<Option<Value>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM runs WHERE request_id = ?1",
                params![request_id],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairvalue_core::valuation::ValuationEngine;
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_envelope() -> ValuationEnvelope {
        let payload = json!({
            "company_name": "Basis AI",
            "methodology": "comparable_companies",
            "as_of_date": "2026-02-18",
            "inputs": {
                "revenue_ltm": 10000000.0,
                "sector": "enterprise_software",
                "private_company_discount_pct": 20
            }
        });
        ValuationEngine::new().value_payload(&payload).unwrap()
    }

    #[test]
    fn save_then_get_round_trips_the_envelope() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("runs.db");
        let store = RunStore::open(db_path.to_str().unwrap()).unwrap();

        let envelope = sample_envelope();
        let request_id = store.save(&envelope).unwrap();
        assert_eq!(request_id, envelope.audit_metadata.request_id);

        let stored = store.get_run(&request_id).unwrap().unwrap();
        assert_eq!(
            stored["valuation_result"]["company_name"],
            json!("Basis AI")
        );
        assert_eq!(
            stored["audit_metadata"]["request_id"],
            json!(request_id)
        );
    }

    #[test]
    fn list_runs_returns_newest_first_up_to_the_limit() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("runs.db");
        let store = RunStore::open(db_path.to_str().unwrap()).unwrap();

        let first = store.save(&sample_envelope()).unwrap();
        let second = store.save(&sample_envelope()).unwrap();

        let runs = store.list_runs(10).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].request_id, second);
        assert_eq!(runs[1].request_id, first);
        assert_eq!(runs[0].methodology, "comparable_companies");

        let limited = store.list_runs(1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn get_run_returns_none_for_an_unknown_id() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("runs.db");
        let store = RunStore::open(db_path.to_str().unwrap()).unwrap();
        assert!(store.get_run("no-such-run").unwrap().is_none());
    }
}
