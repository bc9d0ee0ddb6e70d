use core_types::AppointmentRecord;

/// Orders appointments by date, earliest first. Equal dates keep their input order.
///
/// This is a placeholder for visit-route planning: it sorts, it does not optimize
/// travel between stops.
pub fn order_by_date(appointments: &[AppointmentRecord]) -> Vec<&AppointmentRecord> {
    let mut ordered: Vec<&AppointmentRecord> = appointments.iter().collect();
    ordered.sort_by_key(|a| a.date);
    ordered
}
