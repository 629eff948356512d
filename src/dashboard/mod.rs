//! One render pass of the dashboard: load, transform, classify, lay out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::{DashboardConfig, DeltaOverlay, SignalSeries};
use crate::loader::{load_all, LoadError, SnapshotLoader};
use crate::signal::{advisory_signal, AdvisorySignal, SignalInputs};
use crate::transform::{delta_series, trailing_window, week_over_week, WeekOverWeek};
use crate::types::{IndexDocument, SeriesId, SeriesPoint, SeriesSnapshot};

pub mod chart;
pub mod html;

pub use chart::{ChartBoard, ChartSpec};

/// Derived series carried alongside a snapshot; not a catalogue entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuxSeries {
    pub label: String,
    pub data: Vec<SeriesPoint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PreparedSeries {
    pub snapshot: SeriesSnapshot,
    pub aux: Option<AuxSeries>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesCard {
    pub series_id: SeriesId,
    pub name: String,
    pub wow: WeekOverWeek,
    pub points: usize,
    pub slot: String,
    /// Newest first.
    pub table: Vec<SeriesPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub updated_at: DateTime<Utc>,
    pub signal: AdvisorySignal,
    pub cards: Vec<SeriesCard>,
    pub charts: Vec<ChartSpec>,
}

/// Trim the overlay series to its trailing window and derive its deltas from
/// the trimmed data.
pub fn apply_overlay(snapshot: &mut SeriesSnapshot, overlay: &DeltaOverlay) -> AuxSeries {
    if let Some(kept) = trailing_window(&snapshot.data, overlay.trailing_years) {
        snapshot.set_data(kept);
    }
    AuxSeries {
        label: overlay.label.clone(),
        data: delta_series(&snapshot.data),
    }
}

pub fn prepare(
    cfg: &DashboardConfig,
    store: HashMap<SeriesId, SeriesSnapshot>,
) -> HashMap<SeriesId, PreparedSeries> {
    store
        .into_iter()
        .map(|(id, mut snapshot)| {
            let aux = (id == cfg.overlay.series)
                .then(|| apply_overlay(&mut snapshot, &cfg.overlay));
            (id, PreparedSeries { snapshot, aux })
        })
        .collect()
}

pub fn signal_inputs(
    series: &SignalSeries,
    store: &HashMap<SeriesId, PreparedSeries>,
) -> SignalInputs {
    let latest = |id: &SeriesId| store.get(id).and_then(|p| p.snapshot.latest_value());
    SignalInputs {
        term_premium: latest(&series.term_premium),
        ten_year_yield: latest(&series.ten_year_yield),
        vix: latest(&series.vix),
    }
}

/// Card for `id`; a series missing from the store renders as empty.
pub fn build_card(
    cfg: &DashboardConfig,
    id: &SeriesId,
    prepared: Option<&PreparedSeries>,
) -> SeriesCard {
    let data: &[SeriesPoint] = prepared.map(|p| p.snapshot.data.as_slice()).unwrap_or(&[]);
    SeriesCard {
        series_id: id.clone(),
        name: cfg.display_name(id).to_string(),
        wow: week_over_week(data),
        points: data.len(),
        slot: chart::slot_for(id.as_str()),
        table: data.iter().rev().take(cfg.table_rows).cloned().collect(),
    }
}

pub fn build_chart(
    cfg: &DashboardConfig,
    id: &SeriesId,
    prepared: Option<&PreparedSeries>,
) -> ChartSpec {
    let data: &[SeriesPoint] = prepared.map(|p| p.snapshot.data.as_slice()).unwrap_or(&[]);
    let aux = prepared
        .and_then(|p| p.aux.as_ref())
        .map(|a| (a.label.as_str(), a.data.as_slice()));
    chart::line_chart(chart::slot_for(id.as_str()), cfg.display_name(id), data, aux)
}

/// Pure part of a render pass.
pub fn build_view(
    cfg: &DashboardConfig,
    index: &IndexDocument,
    store: HashMap<SeriesId, SeriesSnapshot>,
) -> DashboardView {
    let prepared = prepare(cfg, store);
    let signal = advisory_signal(signal_inputs(&cfg.signal, &prepared));

    let mut cards = Vec::with_capacity(cfg.catalog.len());
    let mut charts = Vec::with_capacity(cfg.catalog.len());
    for (id, _) in &cfg.catalog {
        let p = prepared.get(id);
        cards.push(build_card(cfg, id, p));
        charts.push(build_chart(cfg, id, p));
    }

    DashboardView {
        updated_at: index.updated_at,
        signal,
        cards,
        charts,
    }
}

/// Load everything currently published and lay it out.
///
/// Any load failure aborts the pass; nothing is drawn for it.
pub async fn render_pass(
    loader: &dyn SnapshotLoader,
    cfg: &DashboardConfig,
    board: &ChartBoard,
) -> Result<DashboardView, LoadError> {
    let (index, store) = load_all(loader).await?;
    let view = build_view(cfg, &index, store);
    for spec in &view.charts {
        board.draw(spec.clone());
    }
    tracing::info!(
        cards = view.cards.len(),
        signal = ?view.signal.color,
        "dashboard rendered"
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FEDERAL_DEBT;
    use crate::types::Frequency;
    use chrono::TimeZone;

    fn snapshot(id: &str, points: &[(&str, f64)]) -> SeriesSnapshot {
        SeriesSnapshot::new(
            id.into(),
            Frequency::Native,
            Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap(),
            points.iter().map(|(d, v)| SeriesPoint::new(*d, *v)).collect(),
        )
    }

    #[test]
    fn overlay_truncates_then_derives_deltas() {
        let cfg = DashboardConfig::default();
        let mut snap = snapshot(
            FEDERAL_DEBT,
            &[("2018-01-01", 1.0), ("2021-01-01", 10.0), ("2022-01-01", 12.0), ("2023-01-01", 9.0)],
        );
        let aux = apply_overlay(&mut snap, &cfg.overlay);
        assert_eq!(snap.points, 3);
        assert_eq!(snap.data.len(), 3);
        assert_eq!(
            aux.data,
            vec![SeriesPoint::new("2022-01-01", 2.0), SeriesPoint::new("2023-01-01", -3.0)]
        );
        assert_eq!(aux.label, cfg.overlay.label);
    }

    #[test]
    fn overlay_on_unparseable_last_date_keeps_data() {
        let cfg = DashboardConfig::default();
        let mut snap = snapshot(FEDERAL_DEBT, &[("2010-01-01", 1.0), ("bad", 3.0)]);
        let aux = apply_overlay(&mut snap, &cfg.overlay);
        assert_eq!(snap.points, 2);
        assert_eq!(aux.data.len(), 1);
    }

    #[test]
    fn table_is_newest_first_and_capped() {
        let cfg = DashboardConfig::default();
        let points: Vec<(String, f64)> = (0..50)
            .map(|i| (format!("2024-{:02}-01", i % 12 + 1), i as f64))
            .collect();
        let mut snap = snapshot("DGS10", &[]);
        snap.set_data(points.iter().map(|(d, v)| SeriesPoint::new(d.clone(), *v)).collect());
        let prepared = PreparedSeries { snapshot: snap, aux: None };

        let card = build_card(&cfg, &"DGS10".into(), Some(&prepared));
        assert_eq!(card.table.len(), 40);
        assert_eq!(card.table[0].value, 49.0);
        assert_eq!(card.points, 50);
        assert_eq!(card.name, "10Y Treasury Yield");
    }

    #[test]
    fn missing_series_renders_empty_card() {
        let cfg = DashboardConfig::default();
        let card = build_card(&cfg, &"DGS30".into(), None);
        assert_eq!(card.points, 0);
        assert_eq!(card.wow, WeekOverWeek::default());
        assert!(card.table.is_empty());
    }
}
