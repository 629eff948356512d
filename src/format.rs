//! Number formatting for cards, tables and the signal banner.

pub const PLACEHOLDER: &str = "-";

/// `-` for missing/NaN, grouped integers from 100 000 up, otherwise at most
/// four fraction digits with trailing zeros removed.
pub fn fmt_num(n: Option<f64>) -> String {
    let Some(n) = n.filter(|v| !v.is_nan()) else {
        return PLACEHOLDER.to_string();
    };
    if n.abs() >= 100_000.0 {
        return group_thousands(&format!("{n:.0}"));
    }
    let s = format!("{n:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    let s = if s == "-0" { "0" } else { s };
    group_thousands(s)
}

pub fn fmt_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p.is_finite() => format!("{p:.2}%"),
        _ => PLACEHOLDER.to_string(),
    }
}

fn group_thousands(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", s),
    };
    let (int, frac) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
