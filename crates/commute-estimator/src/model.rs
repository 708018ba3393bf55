use serde::{Deserialize, Serialize};

/// Door-to-door transport option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Taxi,
    Bus,
    Subway,
}

impl TransportMode {
    pub const ALL: [TransportMode; 3] = [TransportMode::Taxi, TransportMode::Bus, TransportMode::Subway];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Taxi => "taxi",
            TransportMode::Bus => "bus",
            TransportMode::Subway => "subway",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named sub-estimates behind a mode's mean duration.
///
/// Serializes as a flat map containing only the fields the mode populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_drive_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_to_stop_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk_to_station_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_vehicle_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_estimated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_operating: Option<bool>,
}

impl ModeDetail {
    pub fn is_empty(&self) -> bool {
        *self == ModeDetail::default()
    }

    pub fn is_not_operating(&self) -> bool {
        self.not_operating.unwrap_or(false)
    }
}

/// Outcome of evaluating one transport mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeResult {
    pub ok: bool,
    pub mode: TransportMode,
    pub mean_min: f64,
    pub std_min: f64,
    pub p_on_time: f64,
    pub factors: Vec<String>,
    pub detail: ModeDetail,
    pub error: String,
}

impl ModeResult {
    /// Mode could not be evaluated at all
    pub fn unavailable(mode: TransportMode, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            mode,
            mean_min: 0.0,
            std_min: 0.0,
            p_on_time: 0.0,
            factors: Vec::new(),
            detail: ModeDetail::default(),
            error: error.into(),
        }
    }

    /// Evaluated, but the service is not running: reported with `ok=true`
    /// and `p_on_time=0` so the mode still renders as "cannot make it".
    pub fn not_operating(mode: TransportMode, factor: impl Into<String>) -> Self {
        Self {
            ok: true,
            mode,
            mean_min: 0.0,
            std_min: 0.0,
            p_on_time: 0.0,
            factors: vec![factor.into()],
            detail: ModeDetail {
                not_operating: Some(true),
                ..ModeDetail::default()
            },
            error: String::new(),
        }
    }

    /// Copy with display precision applied (1 decimal for minutes, 3 for probability)
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        out.mean_min = round_to(self.mean_min, 1);
        out.std_min = round_to(self.std_min, 1);
        out.p_on_time = round_to(self.p_on_time, 3);
        out.detail.wait_min = self.detail.wait_min.map(|v| round_to(v, 1));
        out.detail.in_vehicle_min = self.detail.in_vehicle_min.map(|v| round_to(v, 1));
        out
    }
}

/// One result per mode; always exactly these three keys when serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuteProbabilities {
    pub taxi: ModeResult,
    pub bus: ModeResult,
    pub subway: ModeResult,
}

impl CommuteProbabilities {
    pub fn get(&self, mode: TransportMode) -> &ModeResult {
        match mode {
            TransportMode::Taxi => &self.taxi,
            TransportMode::Bus => &self.bus,
            TransportMode::Subway => &self.subway,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModeResult> {
        TransportMode::ALL.into_iter().map(move |m| self.get(m))
    }

    pub fn rounded(&self) -> Self {
        Self {
            taxi: self.taxi.rounded(),
            bus: self.bus.rounded(),
            subway: self.subway.rounded(),
        }
    }

    /// Highest on-time probability among modes that are actually running
    pub fn best_p_on_time(&self) -> Option<f64> {
        self.iter()
            .filter(|r| r.ok && !r.detail.is_not_operating())
            .map(|r| r.p_on_time)
            .reduce(f64::max)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_has_zeroed_fields() {
        let r = ModeResult::unavailable(TransportMode::Bus, "no data");
        assert!(!r.ok);
        assert_eq!(r.mean_min, 0.0);
        assert_eq!(r.std_min, 0.0);
        assert_eq!(r.p_on_time, 0.0);
        assert!(r.factors.is_empty());
        assert!(r.detail.is_empty());
        assert_eq!(r.error, "no data");
    }

    #[test]
    fn test_detail_serializes_only_populated_fields() {
        let detail = ModeDetail {
            base_drive_min: Some(20.0),
            ..ModeDetail::default()
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json, serde_json::json!({ "base_drive_min": 20.0 }));
        assert_eq!(serde_json::to_value(ModeDetail::default()).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        let r = ModeResult::not_operating(TransportMode::Subway, "closed");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "subway");
        assert_eq!(json["detail"]["not_operating"], true);
        assert_eq!(json["error"], "");
    }

    #[test]
    fn test_rounded_applies_display_precision() {
        let mut r = ModeResult::not_operating(TransportMode::Taxi, "x");
        r.mean_min = 23.04;
        r.std_min = 4.14;
        r.p_on_time = 0.999_876;
        r.detail.wait_min = Some(7.66);
        let rounded = r.rounded();
        assert_eq!(rounded.mean_min, 23.0);
        assert_eq!(rounded.std_min, 4.1);
        assert_eq!(rounded.p_on_time, 1.0);
        assert_eq!(rounded.detail.wait_min, Some(7.7));
    }
}
