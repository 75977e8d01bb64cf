//! Database module - SQLite storage for workout history, catalog, routines and rotation state

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::ExerciseTemplate;
use crate::planner::{PlannedRoutine, RotationState};

const ROTATION_KEY: &str = "rotation_state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("payload error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored date '{0}'")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Fixed-width UTC timestamp, so text order in SQL is time order
fn sql_timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A single logged set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub weight_kg: Option<f64>,
    pub reps: Option<u32>,
    #[serde(default)]
    pub is_warmup: bool,
}

impl WorkoutSet {
    pub fn working(weight_kg: f64, reps: u32) -> Self {
        Self { weight_kg: Some(weight_kg), reps: Some(reps), is_warmup: false }
    }

    /// Volume (weight × reps) when both fields are present
    pub fn volume(&self) -> Option<f64> {
        match (self.weight_kg, self.reps) {
            (Some(w), Some(r)) => Some(w * r as f64),
            _ => None,
        }
    }
}

/// Exercise as performed within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformedExercise {
    pub exercise_name: String,
    pub sets: Vec<WorkoutSet>,
}

/// Completed workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: String,
    pub exercises: Vec<PerformedExercise>,
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                title TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS session_sets (
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                exercise_index INTEGER NOT NULL,
                exercise_name TEXT NOT NULL,
                set_index INTEGER NOT NULL,
                weight_kg REAL,
                reps INTEGER,
                is_warmup INTEGER NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS exercise_templates (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                primary_muscle_group TEXT NOT NULL,
                equipment TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS routines (
                title TEXT PRIMARY KEY,
                focus TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Insert or replace a session with all of its sets
    pub fn add_session(&self, session: &Session) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM session_sets WHERE session_id = ?1", params![session.id])?;
        tx.execute(
            "INSERT OR REPLACE INTO sessions (id, date, title) VALUES (?1, ?2, ?3)",
            params![session.id, sql_timestamp(session.date), session.title],
        )?;

        for (ex_idx, exercise) in session.exercises.iter().enumerate() {
            for (set_idx, set) in exercise.sets.iter().enumerate() {
                tx.execute(
                    "INSERT INTO session_sets (session_id, exercise_index, exercise_name, set_index, weight_kg, reps, is_warmup)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        session.id,
                        ex_idx as i64,
                        exercise.exercise_name,
                        set_idx as i64,
                        set.weight_kg,
                        set.reps,
                        set.is_warmup,
                    ],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All sessions, oldest first
    pub fn get_sessions(&self) -> Result<Vec<Session>> {
        self.query_sessions(None)
    }

    /// Sessions on or after `since`, oldest first
    pub fn get_sessions_since(&self, since: DateTime<Utc>) -> Result<Vec<Session>> {
        self.query_sessions(Some(since))
    }

    fn query_sessions(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, title FROM sessions WHERE ?1 IS NULL OR date >= ?1 ORDER BY date ASC, id ASC",
        )?;

        let headers = stmt
            .query_map(params![since.map(sql_timestamp)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut sessions = Vec::with_capacity(headers.len());
        for (id, date_str, title) in headers {
            let date = DateTime::parse_from_rfc3339(&date_str)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| StoreError::InvalidDate(date_str.clone()))?;
            let exercises = self.load_exercises(&id)?;
            sessions.push(Session { id, date, title, exercises });
        }
        Ok(sessions)
    }

    fn load_exercises(&self, session_id: &str) -> Result<Vec<PerformedExercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT exercise_index, exercise_name, weight_kg, reps, is_warmup FROM session_sets
             WHERE session_id = ?1 ORDER BY exercise_index ASC, set_index ASC",
        )?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    WorkoutSet {
                        weight_kg: row.get(2)?,
                        reps: row.get(3)?,
                        is_warmup: row.get(4)?,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut exercises: Vec<(i64, PerformedExercise)> = Vec::new();
        for (idx, name, set) in rows {
            match exercises.last_mut() {
                Some((last_idx, ex)) if *last_idx == idx => ex.sets.push(set),
                _ => exercises.push((idx, PerformedExercise { exercise_name: name, sets: vec![set] })),
            }
        }
        Ok(exercises.into_iter().map(|(_, ex)| ex).collect())
    }

    /// Replace the stored catalog with a fresh one
    pub fn replace_catalog(&self, templates: &[ExerciseTemplate]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM exercise_templates", [])?;
        for t in templates {
            tx.execute(
                "INSERT OR REPLACE INTO exercise_templates (id, name, primary_muscle_group, equipment) VALUES (?1, ?2, ?3, ?4)",
                params![t.id, t.name, t.primary_muscle_group, t.equipment],
            )?;
        }
        tx.commit()?;
        info!("Stored {} exercise templates", templates.len());
        Ok(templates.len())
    }

    pub fn get_catalog(&self) -> Result<Vec<ExerciseTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, primary_muscle_group, equipment FROM exercise_templates ORDER BY rowid ASC",
        )?;
        let templates = stmt
            .query_map([], |row| {
                Ok(ExerciseTemplate {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    primary_muscle_group: row.get(2)?,
                    equipment: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    pub fn load_rotation(&self) -> Result<Option<RotationState>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![ROTATION_KEY], |row| row.get(0))
            .optional()?;
        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_rotation(&self, state: &RotationState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![ROTATION_KEY, json],
        )?;
        debug!("Rotation state saved: {} on {}", state.last_focus, state.last_scheduled_date);
        Ok(())
    }

    /// Upsert a routine by title. Returns true when an existing routine was updated.
    pub fn publish_routine(&self, routine: &PlannedRoutine) -> Result<bool> {
        let existing: Option<String> = self
            .conn
            .query_row("SELECT title FROM routines WHERE title = ?1", params![routine.title], |row| row.get(0))
            .optional()?;

        let payload = serde_json::to_string(routine)?;
        self.conn.execute(
            "INSERT INTO routines (title, focus, payload, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(title) DO UPDATE SET focus = excluded.focus, payload = excluded.payload, updated_at = excluded.updated_at",
            params![routine.title, routine.focus.name(), payload, sql_timestamp(Utc::now())],
        )?;

        let updated = existing.is_some();
        if updated {
            info!("Routine updated: {}", routine.title);
        } else {
            info!("Routine created: {}", routine.title);
        }
        Ok(updated)
    }

    /// Most recently published routine
    pub fn latest_routine(&self) -> Result<Option<PlannedRoutine>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM routines ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
