//! Server-side HTML for a rendered view, plus the error page shown when a
//! render pass fails.

use std::fmt::Write;

use super::{DashboardView, SeriesCard};
use crate::format::{fmt_num, fmt_pct};
use crate::signal::AdvisorySignal;

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// JSON that is safe to inline inside a `<script>` element.
fn inline_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn signal_banner(signal: &AdvisorySignal) -> String {
    let color = serde_json::to_value(signal.color)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let metrics = format!(
        "THREEFYTP10={} | DGS10={} | VIX={}",
        fmt_num(signal.inputs.term_premium),
        fmt_num(signal.inputs.ten_year_yield),
        fmt_num(signal.inputs.vix),
    );
    let reasons = if signal.reasons.is_empty() {
        String::new()
    } else {
        format!("Triggered: {}", signal.reasons.join("; "))
    };
    format!(
        concat!(
            r#"<section class="signal"><span id="tltLight" class="status {color}"></span>"#,
            r#"<div id="tltAction">{}</div><div id="tltMetrics">{}</div>"#,
            r#"<div id="tltReason">{}</div></section>"#,
        ),
        escape(&signal.action),
        escape(&metrics),
        escape(&reasons),
        color = color,
    )
}

pub fn series_card(card: &SeriesCard) -> String {
    let mut rows = String::new();
    for p in &card.table {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&p.date),
            fmt_num(Some(p.value))
        );
    }
    format!(
        r#"<div class="card">
  <div class="head">
    <div>
      <div class="title"><b>{id}</b> - {name}</div>
      <div class="kpis">
        <div class="kpi"><b>Latest</b>{last}</div>
        <div class="kpi"><b>Prior</b>{prev}</div>
        <div class="kpi"><b>WoW</b>{delta} ({pct})</div>
      </div>
    </div>
    <div class="muted">points: {points}</div>
  </div>
  <div class="chartWrap"><canvas id="{slot}"></canvas></div>
  <details>
    <summary>Show table (latest {n})</summary>
    <table><thead><tr><th>Date</th><th>Value</th></tr></thead><tbody>{rows}</tbody></table>
  </details>
</div>"#,
        id = escape(card.series_id.as_str()),
        name = escape(&card.name),
        last = fmt_num(card.wow.last),
        prev = fmt_num(card.wow.prev),
        delta = fmt_num(card.wow.delta),
        pct = fmt_pct(card.wow.pct),
        points = card.points,
        slot = escape(&card.slot),
        n = card.table.len(),
    )
}

pub fn render_page(view: &DashboardView) -> serde_json::Result<String> {
    let cards: String = view.cards.iter().map(series_card).collect();
    let charts = inline_json(&view.charts)?;
    Ok(format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Macro Dashboard</title>
<script src="{CHART_JS}"></script>
</head>
<body>
<header>
  <h1>Macro Dashboard</h1>
  <div>Updated: <span id="updatedAt">{updated}</span></div>
  <form method="get" action="/"><button id="reloadBtn" type="submit">Reload</button></form>
</header>
{banner}
<div id="grid">{cards}</div>
<script type="application/json" id="chartSpecs">{charts}</script>
<script>
for (const spec of JSON.parse(document.getElementById("chartSpecs").textContent)) {{
  const canvas = document.getElementById(spec.slot);
  if (!canvas) continue;
  Chart.getChart(canvas)?.destroy();
  new Chart(canvas, {{
    data: {{
      labels: spec.labels,
      datasets: spec.datasets.map(d => ({{
        type: d.kind, label: d.label, data: d.values,
        yAxisID: d.axis === "secondary" ? "y1" : "y", borderWidth: 2
      }}))
    }},
    options: {{
      responsive: true, maintainAspectRatio: false, spanGaps: false,
      scales: {{
        x: {{ ticks: {{ maxTicksLimit: 8 }} }},
        y1: {{
          position: "right",
          display: spec.datasets.length > 1,
          grid: {{ drawOnChartArea: false }}
        }}
      }}
    }}
  }});
}}
</script>
</body>
</html>
"#,
        updated = escape(&view.updated_at.to_rfc3339()),
        banner = signal_banner(&view.signal),
    ))
}

/// Shown instead of the dashboard when a render pass fails; the alert blocks
/// until dismissed.
pub fn render_error(message: &str) -> String {
    let js = serde_json::to_string(message)
        .unwrap_or_else(|_| "\"render failed\"".to_string())
        .replace("</", "<\\/");
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Macro Dashboard</title></head>
<body>
<p class="error">{}</p>
<form method="get" action="/"><button id="reloadBtn" type="submit">Reload</button></form>
<script>alert({js});</script>
</body>
</html>
"#,
        escape(message),
    )
}
