use super::Observation;
use crate::types::SeriesPoint;

/// FRED's marker for "no observation on this date".
pub const MISSING_SENTINEL: &str = ".";

/// Turn newest-first upstream observations into stored points.
///
/// Drops the missing sentinel and anything that is not a finite number,
/// flips to oldest-first, then keeps the newest `max_points`. Output dates are
/// ascending and unique.
pub fn normalize_observations(
    observations: Vec<Observation>,
    max_points: usize,
) -> Vec<SeriesPoint> {
    let mut data: Vec<SeriesPoint> = observations
        .into_iter()
        .filter(|o| o.value != MISSING_SENTINEL)
        .filter_map(|o| match o.value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Some(SeriesPoint::new(o.date, v)),
            _ => {
                tracing::debug!(
                    date = %o.date,
                    value = %o.value,
                    "dropping non-numeric observation"
                );
                None
            }
        })
        .collect();

    data.reverse();
    // Upstream already sorts; this only matters for malformed responses.
    data.sort_by(|a, b| a.date.cmp(&b.date));
    data.dedup_by(|later, earlier| later.date == earlier.date);

    if data.len() > max_points {
        data.drain(..data.len() - max_points);
    }
    data
}
