use std::path::Path;

use rusqlite::{Connection, Row, params};
use tracing::info;

use crate::converters::missile_launches::Record;
use crate::error::Result;

/// SQLite table holding one row per launch record
pub struct LaunchStore {
    conn: Connection,
}

impl LaunchStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Replace the table contents with `records`, in one transaction.
    pub fn replace_all(&mut self, records: &[Record]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            DROP TABLE IF EXISTS MissileLaunches;
            CREATE TABLE MissileLaunches (
                dateAndTime_inUtc DATETIME,
                startingLocation_city VARCHAR,
                startingLocation_coordinates VARCHAR,
                landingLocation VARCHAR,
                distanceTraveled_km INTEGER
            );
            "#,
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO MissileLaunches (dateAndTime_inUtc, startingLocation_city, \
                 startingLocation_coordinates, landingLocation, distanceTraveled_km) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.timestamp(),
                    record.origin_city(),
                    record.origin_coordinates(),
                    record.destination(),
                    record.distance_km(),
                ])?;
            }
        }
        tx.commit()?;

        info!(records = records.len(), "loaded MissileLaunches");
        Ok(())
    }

    /// All records, longest distance first.
    pub fn sorted_by_distance(&self) -> Result<Vec<Record>> {
        // INTEGER affinity stores numeric distances as numbers, so the sort is numeric.
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                COALESCE(dateAndTime_inUtc, ''),
                COALESCE(startingLocation_city, ''),
                COALESCE(startingLocation_coordinates, ''),
                COALESCE(landingLocation, ''),
                COALESCE(CAST(distanceTraveled_km AS TEXT), '')
            FROM MissileLaunches
            ORDER BY distanceTraveled_km DESC
            "#,
        )?;

        let records = stmt
            .query_map([], |row: &Row| {
                Ok(Record::from_columns(
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        Ok(records)
    }
}
