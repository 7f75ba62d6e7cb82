use crate::entity::{EntityKind, Fields};
use crate::filter::Searchable;
use crate::payments::Payment;
use crate::roster::RosterEntry;
use crate::schema::schema_for;
use anyhow::Context;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {id} names unknown entity {entity:?}")]
    UnknownEntity { id: String, entity: String },
    #[error("record {id} has an unreadable field payload")]
    Payload {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    pub entity: EntityKind,
    pub seq: i64,
    pub fields: Fields,
    pub valid: bool,
    pub created_at: String,
}

impl Searchable for StoredRecord {
    fn search_values(&self) -> Vec<&str> {
        schema_for(self.entity)
            .search
            .iter()
            .filter_map(|name| self.fields.get(*name).and_then(|v| v.as_text()))
            .collect()
    }
}

fn next_seq(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> anyhow::Result<i64> {
    Ok(conn.query_row(sql, params, |r| r.get(0))?)
}

pub fn append_record(
    conn: &Connection,
    kind: EntityKind,
    fields: &Fields,
    valid: bool,
) -> anyhow::Result<StoredRecord> {
    let seq = next_seq(
        conn,
        "SELECT COALESCE(MAX(seq), -1) + 1 FROM records WHERE entity = ?",
        [kind.as_str()],
    )?;
    let record = StoredRecord {
        id: Uuid::new_v4().to_string(),
        entity: kind,
        seq,
        fields: fields.clone(),
        valid,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    conn.execute(
        "INSERT INTO records(id, entity, seq, fields_json, valid, created_at)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &record.id,
            kind.as_str(),
            record.seq,
            serde_json::to_string(&record.fields)?,
            if valid { 1 } else { 0 },
            &record.created_at,
        ),
    )
    .with_context(|| format!("insert {} record", kind.as_str()))?;
    Ok(record)
}

pub fn list_records(conn: &Connection, kind: EntityKind) -> anyhow::Result<Vec<StoredRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, entity, seq, fields_json, valid, created_at
         FROM records
         WHERE entity = ?
         ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([kind.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(rows.len());
    for (id, entity, seq, fields_json, valid, created_at) in rows {
        let Some(entity) = EntityKind::parse(&entity) else {
            return Err(StoreError::UnknownEntity { id, entity }.into());
        };
        let fields: Fields = match serde_json::from_str(&fields_json) {
            Ok(f) => f,
            Err(source) => return Err(StoreError::Payload { id, source }.into()),
        };
        out.push(StoredRecord {
            id,
            entity,
            seq,
            fields,
            valid: valid != 0,
            created_at,
        });
    }
    Ok(out)
}

pub fn append_roster(conn: &Connection, entry: &RosterEntry) -> anyhow::Result<()> {
    let seq = next_seq(conn, "SELECT COALESCE(MAX(seq), -1) + 1 FROM roster", [])?;
    conn.execute(
        "INSERT INTO roster(matricule, name, age, seq) VALUES(?, ?, ?, ?)",
        (&entry.matricule, &entry.name, entry.age, seq),
    )
    .context("insert roster entry")?;
    Ok(())
}

pub fn list_roster(conn: &Connection) -> anyhow::Result<Vec<RosterEntry>> {
    let mut stmt = conn.prepare("SELECT name, age, matricule FROM roster ORDER BY seq")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(RosterEntry {
                name: row.get(0)?,
                age: row.get(1)?,
                matricule: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn append_payment(conn: &Connection, payment: &Payment) -> anyhow::Result<()> {
    let seq = next_seq(conn, "SELECT COALESCE(MAX(seq), -1) + 1 FROM payments", [])?;
    conn.execute(
        "INSERT INTO payments(id, seq, nom, matricule, montant, paid_on)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            Uuid::new_v4().to_string(),
            seq,
            &payment.nom,
            &payment.matricule,
            &payment.montant,
            &payment.date,
        ),
    )
    .context("insert payment")?;
    Ok(())
}

pub fn list_payments(conn: &Connection) -> anyhow::Result<Vec<Payment>> {
    let mut stmt =
        conn.prepare("SELECT nom, matricule, montant, paid_on FROM payments ORDER BY seq")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Payment {
                nom: row.get(0)?,
                matricule: row.get(1)?,
                montant: row.get(2)?,
                date: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_session_db;
    use crate::entity::FieldValue;
    use crate::filter::filter_view;

    fn class(name: &str, level: &str, option: &str) -> Fields {
        [("name", name), ("level", level), ("option", option)]
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::text(*v)))
            .collect()
    }

    #[test]
    fn records_keep_submission_order_per_entity() {
        let conn = open_session_db().expect("open");
        append_record(&conn, EntityKind::SchoolClass, &class("CP A", "primary", "french"), true)
            .expect("append");
        append_record(&conn, EntityKind::SchoolClass, &class("", "", ""), false)
            .expect("append invalid");
        append_record(&conn, EntityKind::SchoolClass, &class("Class 3", "secondary", "english"), true)
            .expect("append");

        let rows = list_records(&conn, EntityKind::SchoolClass).expect("list");
        let seqs: Vec<_> = rows.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert!(!rows[1].valid);
        assert_eq!(rows[2].fields["name"], FieldValue::text("Class 3"));
        assert!(list_records(&conn, EntityKind::Student).expect("list").is_empty());
    }

    #[test]
    fn filter_over_stored_records_returns_the_single_match_unchanged() {
        let conn = open_session_db().expect("open");
        let target = class("CE2 Bilingue", "secondary", "english");
        for f in [
            class("CP A", "primary", "french"),
            target.clone(),
            class("CM1", "secondary", "french"),
        ] {
            append_record(&conn, EntityKind::SchoolClass, &f, true).expect("append");
        }
        let rows = list_records(&conn, EntityKind::SchoolClass).expect("list");
        let hits = filter_view(&rows, "bilingue");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].fields, target);
        assert_eq!(filter_view(&rows, "").len(), 3);
    }

    #[test]
    fn roster_and_payments_round_trip_in_order() {
        let conn = open_session_db().expect("open");
        for (name, m) in [("Amina", "ELV-123456"), ("Paul", "ELV-654321")] {
            append_roster(
                &conn,
                &RosterEntry {
                    name: name.into(),
                    age: None,
                    matricule: m.into(),
                },
            )
            .expect("roster");
        }
        let dup = append_roster(
            &conn,
            &RosterEntry {
                name: "Autre".into(),
                age: Some(7),
                matricule: "ELV-123456".into(),
            },
        );
        assert!(dup.is_err());
        let roster = list_roster(&conn).expect("list roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].name, "Paul");

        let p = Payment {
            nom: "Amina".into(),
            matricule: "ELV-123456".into(),
            montant: "15000".into(),
            date: "03/10/2024".into(),
        };
        append_payment(&conn, &p).expect("pay");
        assert_eq!(list_payments(&conn).expect("list payments"), vec![p]);
    }
}
