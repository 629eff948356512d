use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::types::SeriesPoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Line,
    Bar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub kind: DatasetKind,
    pub axis: Axis,
    /// One entry per chart label; `None` is drawn as a gap.
    pub values: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Canvas element the chart is bound to.
    pub slot: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

pub fn slot_for(series_id: &str) -> String {
    format!("c_{series_id}")
}

/// Line chart of `primary`, plus `aux` as bars on the secondary axis.
///
/// Aux points are matched to the primary dates exactly; primary dates with no
/// aux point get `None`, never zero.
pub fn line_chart(
    slot: String,
    label: &str,
    primary: &[SeriesPoint],
    aux: Option<(&str, &[SeriesPoint])>,
) -> ChartSpec {
    let labels: Vec<String> = primary.iter().map(|p| p.date.clone()).collect();
    let mut datasets = vec![Dataset {
        label: label.to_string(),
        kind: DatasetKind::Line,
        axis: Axis::Primary,
        values: primary.iter().map(|p| Some(p.value)).collect(),
    }];

    if let Some((aux_label, aux_points)) = aux {
        let values = labels
            .iter()
            .map(|d| aux_points.iter().find(|p| &p.date == d).map(|p| p.value))
            .collect();
        datasets.push(Dataset {
            label: aux_label.to_string(),
            kind: DatasetKind::Bar,
            axis: Axis::Secondary,
            values,
        });
    }

    ChartSpec { slot, labels, datasets }
}

/// Charts currently bound to each slot.
///
/// Drawing into an occupied slot destroys the previous chart first, so
/// repeated renders never stack duplicates. Concurrent render passes are not
/// serialised: whichever draws last owns the slot.
#[derive(Debug, Default)]
pub struct ChartBoard {
    slots: DashMap<String, ChartSpec>,
}

impl ChartBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `spec` to its slot, returning the chart it replaced.
    pub fn draw(&self, spec: ChartSpec) -> Option<ChartSpec> {
        let slot = spec.slot.clone();
        let previous = self.slots.insert(slot.clone(), spec);
        if previous.is_some() {
            tracing::debug!(%slot, "destroyed previous chart");
        }
        previous
    }

    pub fn get(&self, slot: &str) -> Option<ChartSpec> {
        self.slots.get(slot).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(items: &[(&str, f64)]) -> Vec<SeriesPoint> {
        items.iter().map(|(d, v)| SeriesPoint::new(*d, *v)).collect()
    }

    #[test]
    fn overlay_is_aligned_by_date_with_gaps() {
        let level = pts(&[("2024-01-01", 10.0), ("2024-04-01", 12.0), ("2024-07-01", 9.0)]);
        let delta = pts(&[("2024-04-01", 2.0), ("2024-07-01", -3.0)]);
        let spec = line_chart(slot_for("GFDEBTN"), "Debt", &level, Some(("Change", &delta)));

        assert_eq!(spec.slot, "c_GFDEBTN");
        assert_eq!(spec.datasets.len(), 2);
        let bars = &spec.datasets[1];
        assert_eq!(bars.kind, DatasetKind::Bar);
        assert_eq!(bars.axis, Axis::Secondary);
        assert_eq!(bars.values, vec![None, Some(2.0), Some(-3.0)]);
    }

    #[test]
    fn plain_chart_has_single_line() {
        let spec = line_chart(slot_for("DGS10"), "10Y", &pts(&[("2024-01-01", 4.0)]), None);
        assert_eq!(spec.datasets.len(), 1);
        assert_eq!(spec.datasets[0].kind, DatasetKind::Line);
        assert_eq!(spec.labels, vec!["2024-01-01"]);
    }

    #[test]
    fn redraw_replaces_bound_chart() {
        let board = ChartBoard::new();
        let first = line_chart(slot_for("VIXCLS"), "VIX", &pts(&[("2024-01-01", 14.0)]), None);
        let second = line_chart(slot_for("VIXCLS"), "VIX", &pts(&[("2024-01-08", 15.0)]), None);

        assert!(board.draw(first.clone()).is_none());
        assert_eq!(board.draw(second.clone()), Some(first));
        assert_eq!(board.len(), 1);
        assert_eq!(board.get("c_VIXCLS"), Some(second));
    }
}
