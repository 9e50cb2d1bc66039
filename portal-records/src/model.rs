//! Record shapes used by the portal pages.

use chrono::{NaiveDate, NaiveTime};
use portal_query::{FieldValue, Record};
use serde::{Deserialize, Serialize};

/// Care status shown on the patient list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PatientStatus {
    Active,
    Inactive,
    Critical,
}

impl PatientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Inactive => "Inactive",
            PatientStatus::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    pub status: PatientStatus,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
}

impl Record for Patient {
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "email", "condition"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "name" => FieldValue::text(&self.name),
            "age" => FieldValue::Number(f64::from(self.age)),
            "gender" => FieldValue::text(&self.gender),
            "email" => FieldValue::text(&self.email),
            "phone" => FieldValue::optional_text(self.phone.as_deref()),
            "condition" => FieldValue::optional_text(self.condition.as_deref()),
            "status" => FieldValue::text(self.status.as_str()),
            "lastVisit" => FieldValue::optional_date(self.last_visit),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub email: String,
    /// Free text such as `"15 years"`.
    pub experience: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub available: bool,
}

impl Record for Doctor {
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "specialty", "email"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "name" => FieldValue::text(&self.name),
            "specialty" => FieldValue::text(&self.specialty),
            "email" => FieldValue::text(&self.email),
            "experience" => FieldValue::measured(&self.experience),
            "rating" => self
                .rating
                .map(FieldValue::Number)
                .unwrap_or(FieldValue::Empty),
            "available" => FieldValue::Flag(self.available),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub doctor_name: String,
    #[serde(default)]
    pub department: Option<String>,
    pub date: NaiveDate,
    /// Accepts `14:30`, `9:00` or `02:00 PM`; written back as `HH:MM`.
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AppointmentStatus,
}

impl Record for Appointment {
    const SEARCH_FIELDS: &'static [&'static str] = &["patientName", "doctorName", "type"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "patientName" => FieldValue::text(&self.patient_name),
            "doctorName" => FieldValue::text(&self.doctor_name),
            "department" => FieldValue::optional_text(self.department.as_deref()),
            "date" => FieldValue::Date(self.date),
            "time" => FieldValue::Time(self.time),
            "type" => FieldValue::text(&self.kind),
            "status" => FieldValue::text(self.status.as_str()),
            _ => return None,
        };
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mood {
    Great,
    Good,
    Okay,
    Low,
    Bad,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Great => "Great",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Low => "Low",
            Mood::Bad => "Bad",
        }
    }
}

/// Wellness journal entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    pub date: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record for JournalEntry {
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "content", "tags"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "title" => FieldValue::text(&self.title),
            "content" => FieldValue::text(&self.content),
            "mood" => FieldValue::text(self.mood.as_str()),
            "date" => FieldValue::Date(self.date),
            "tags" => FieldValue::list(&self.tags),
            _ => return None,
        };
        Some(value)
    }
}

mod slot_time {
    use chrono::NaiveTime;
    use portal_query::normalize::parse_time_of_day;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_time_of_day(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized time of day `{raw}`")))
    }
}
