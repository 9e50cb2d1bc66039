//! Dashboard views derived from full collections on every call.

use chrono::NaiveDate;
use portal_query::{query, Criteria};

use crate::{Appointment, AppointmentStatus, Patient, PatientStatus};

/// Appointments on `date`, earliest slot first.
pub fn appointments_on(appointments: &[Appointment], date: NaiveDate) -> Vec<&Appointment> {
    let criteria = Criteria::new()
        .filter("date", date.format("%Y-%m-%d").to_string())
        .sort_by("time");
    query(appointments, &criteria)
}

/// Appointments from `from` onwards that are not cancelled, in calendar order.
pub fn upcoming_appointments(appointments: &[Appointment], from: NaiveDate) -> Vec<&Appointment> {
    let pending: Vec<&Appointment> = appointments
        .iter()
        .filter(|appt| appt.date >= from && appt.status != AppointmentStatus::Cancelled)
        .collect();

    // Stable sorts: order by slot, then by day, so same-day slots stay ordered.
    let by_time: Vec<&Appointment> = query(&pending, &Criteria::new().sort_by("time"))
        .into_iter()
        .copied()
        .collect();
    let by_date: Vec<&Appointment> = query(&by_time, &Criteria::new().sort_by("date"))
        .into_iter()
        .copied()
        .collect();
    by_date
}

/// Patients flagged critical, by name.
pub fn critical_patients(patients: &[Patient]) -> Vec<&Patient> {
    let criteria = Criteria::new()
        .filter("status", PatientStatus::Critical.as_str())
        .sort_by("name");
    query(patients, &criteria)
}
