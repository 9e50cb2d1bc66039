//! Typed portal collections loaded from JSON, plus views derived from them.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use log::warn;
use portal_query::{Criteria, QueryEngine, Record};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

mod model;
pub mod views;

pub use model::{
    Appointment, AppointmentStatus, Doctor, JournalEntry, Mood, Patient, PatientStatus,
};

/// Errors raised while turning JSON into a typed collection.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("could not read records: {0}")]
    Parse(String),
    #[error("expected a JSON array of records")]
    NotAnArray,
    #[error("duplicate record id `{0}`")]
    DuplicateId(String),
    #[error("unknown collection `{0}`")]
    UnknownKind(String),
    #[error("could not serialize records: {0}")]
    Serialize(String),
}

/// Names the collections a page can hand to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Patients,
    Doctors,
    Appointments,
    Journal,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Patients,
        RecordKind::Doctors,
        RecordKind::Appointments,
        RecordKind::Journal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Patients => "patients",
            RecordKind::Doctors => "doctors",
            RecordKind::Appointments => "appointments",
            RecordKind::Journal => "journal",
        }
    }
}

impl FromStr for RecordKind {
    type Err = RecordError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| RecordError::UnknownKind(value.to_string()))
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a JSON array string into records, rejecting duplicate ids.
pub fn load_collection<R>(json: &str) -> Result<Vec<R>, RecordError>
where
    R: Record + DeserializeOwned,
{
    let value: Value =
        serde_json::from_str(json).map_err(|err| RecordError::Parse(err.to_string()))?;
    load_collection_value(value)
}

/// Same as [`load_collection`] for an already parsed `serde_json::Value`.
pub fn load_collection_value<R>(value: Value) -> Result<Vec<R>, RecordError>
where
    R: Record + DeserializeOwned,
{
    if !value.is_array() {
        return Err(RecordError::NotAnArray);
    }

    let records: Vec<R> =
        serde_json::from_value(value).map_err(|err| RecordError::Parse(err.to_string()))?;
    ensure_unique_ids(&records)?;
    Ok(records)
}

fn ensure_unique_ids<R: Record>(records: &[R]) -> Result<(), RecordError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            warn!(
                "event=collection_rejected reason=duplicate_id id={} size={}",
                record.id(),
                records.len()
            );
            return Err(RecordError::DuplicateId(record.id().to_string()));
        }
    }
    Ok(())
}

/// A loaded collection whose record type is picked at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Patients(Vec<Patient>),
    Doctors(Vec<Doctor>),
    Appointments(Vec<Appointment>),
    Journal(Vec<JournalEntry>),
}

impl Collection {
    pub fn from_json(kind: RecordKind, json: &str) -> Result<Self, RecordError> {
        let value: Value =
            serde_json::from_str(json).map_err(|err| RecordError::Parse(err.to_string()))?;
        Self::from_value(kind, value)
    }

    pub fn from_value(kind: RecordKind, value: Value) -> Result<Self, RecordError> {
        Ok(match kind {
            RecordKind::Patients => Collection::Patients(load_collection_value(value)?),
            RecordKind::Doctors => Collection::Doctors(load_collection_value(value)?),
            RecordKind::Appointments => Collection::Appointments(load_collection_value(value)?),
            RecordKind::Journal => Collection::Journal(load_collection_value(value)?),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Collection::Patients(_) => RecordKind::Patients,
            Collection::Doctors(_) => RecordKind::Doctors,
            Collection::Appointments(_) => RecordKind::Appointments,
            Collection::Journal(_) => RecordKind::Journal,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Patients(records) => records.len(),
            Collection::Doctors(records) => records.len(),
            Collection::Appointments(records) => records.len(),
            Collection::Journal(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `criteria` and serializes the projection back to JSON.
    pub fn query_value(
        &self,
        engine: &QueryEngine,
        criteria: &Criteria,
    ) -> Result<Value, RecordError> {
        match self {
            Collection::Patients(records) => to_json(&engine.query(records, criteria)),
            Collection::Doctors(records) => to_json(&engine.query(records, criteria)),
            Collection::Appointments(records) => to_json(&engine.query(records, criteria)),
            Collection::Journal(records) => to_json(&engine.query(records, criteria)),
        }
    }

    pub fn facets(&self, engine: &QueryEngine, field: &str) -> BTreeMap<String, usize> {
        match self {
            Collection::Patients(records) => engine.facets(records, field),
            Collection::Doctors(records) => engine.facets(records, field),
            Collection::Appointments(records) => engine.facets(records, field),
            Collection::Journal(records) => engine.facets(records, field),
        }
    }
}

fn to_json<T: Serialize>(records: &[&T]) -> Result<Value, RecordError> {
    serde_json::to_value(records).map_err(|err| RecordError::Serialize(err.to_string()))
}
