//! TLT duration signal from term premium, the 10Y yield and VIX.
//!
//! - Green: term premium negative, 10Y below 3.5 and VIX below 18, all at once.
//! - Red: term premium above 0.5, or 10Y above 4.5, or VIX above 25.
//! - Yellow: everything else.
//!
//! Red reports the bearish conditions that hold; yellow reports the bullish
//! ones that hold even though they did not all hold together; green reports
//! nothing.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalColor {
    Green,
    Yellow,
    Red,
}

impl SignalColor {
    pub fn action(self) -> &'static str {
        match self {
            SignalColor::Green => "Buy (scale into TLT / add duration)",
            SignalColor::Yellow => "Sell Call / Wait (neutral: covered calls or stand aside)",
            SignalColor::Red => "Wait / Hedge (no adds; protective puts or shorter duration)",
        }
    }
}

/// Latest values of the three inputs. `None` when a series has no data; every
/// comparison against a missing value is false.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalInputs {
    pub term_premium: Option<f64>,
    pub ten_year_yield: Option<f64>,
    pub vix: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorySignal {
    pub color: SignalColor,
    pub action: String,
    pub reasons: Vec<String>,
    pub inputs: SignalInputs,
}

fn below(v: Option<f64>, limit: f64) -> bool {
    v.is_some_and(|x| x < limit)
}

fn above(v: Option<f64>, limit: f64) -> bool {
    v.is_some_and(|x| x > limit)
}

fn holding(conds: &[(bool, &str)]) -> Vec<String> {
    conds.iter().filter(|(hit, _)| *hit).map(|(_, r)| r.to_string()).collect()
}

pub fn advisory_signal(inputs: SignalInputs) -> AdvisorySignal {
    let SignalInputs {
        term_premium: tp,
        ten_year_yield: y10,
        vix,
    } = inputs;

    let bullish = [
        (below(tp, 0.0), "term premium < 0"),
        (below(y10, 3.5), "10y yield < 3.5"),
        (below(vix, 18.0), "vix < 18"),
    ];
    let bearish = [
        (above(tp, 0.5), "term premium > 0.5"),
        (above(y10, 4.5), "10y yield > 4.5"),
        (above(vix, 25.0), "vix > 25"),
    ];
    let (color, reasons) = if bullish.iter().all(|(hit, _)| *hit) {
        (SignalColor::Green, Vec::new())
    } else if bearish.iter().any(|(hit, _)| *hit) {
        (SignalColor::Red, holding(&bearish))
    } else {
        (SignalColor::Yellow, holding(&bullish))
    };

    AdvisorySignal {
        color,
        action: color.action().to_string(),
        reasons,
        inputs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(tp: f64, y10: f64, vix: f64) -> AdvisorySignal {
        advisory_signal(SignalInputs {
            term_premium: Some(tp),
            ten_year_yield: Some(y10),
            vix: Some(vix),
        })
    }

    #[test]
    fn all_bullish_conditions_is_green_without_reasons() {
        let s = run(-0.2, 3.0, 15.0);
        assert_eq!(s.color, SignalColor::Green);
        assert!(s.reasons.is_empty());
        assert!(s.action.starts_with("Buy"));
    }

    #[test]
    fn term_premium_spike_is_red_with_only_bearish_reason() {
        let s = run(0.6, 4.0, 10.0);
        assert_eq!(s.color, SignalColor::Red);
        assert_eq!(s.reasons, vec!["term premium > 0.5"]);
    }

    #[test]
    fn partial_bullish_is_yellow_with_bullish_reasons() {
        let s = run(-0.1, 4.0, 20.0);
        assert_eq!(s.color, SignalColor::Yellow);
        assert_eq!(s.reasons, vec!["term premium < 0"]);
    }

    #[test]
    fn every_bearish_condition_is_reported() {
        let s = run(0.8, 4.8, 30.0);
        assert_eq!(s.color, SignalColor::Red);
        assert_eq!(s.reasons, vec!["term premium > 0.5", "10y yield > 4.5", "vix > 25"]);
    }

    #[test]
    fn thresholds_are_strict() {
        let s = run(0.0, 3.5, 18.0);
        assert_eq!(s.color, SignalColor::Yellow);
        assert!(s.reasons.is_empty());
        let s = run(0.5, 4.5, 25.0);
        assert_eq!(s.color, SignalColor::Yellow);
    }

    #[test]
    fn missing_inputs_are_neutral() {
        let s = advisory_signal(SignalInputs::default());
        assert_eq!(s.color, SignalColor::Yellow);
        assert!(s.reasons.is_empty());
    }
}
