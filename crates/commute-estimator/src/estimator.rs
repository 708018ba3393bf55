use serde::{Deserialize, Serialize};

use crate::model::{CommuteProbabilities, ModeDetail, ModeResult, TransportMode};
use crate::probability::ontime_prob;

/// Hours before this are treated as early morning, when transit is likely suspended.
pub const EARLY_MORNING_END_HOUR: u32 = 6;

const FACTOR_TIGHT: &str = "time is tight";
const FACTOR_LONG_DISTANCE: &str = "long-distance trip";
const FACTOR_NO_LIVE_DATA: &str = "no live data, using average wait";
const FACTOR_LONG_WAIT: &str = "long wait";
const FACTOR_NOT_OPERATING: &str = "not currently operating (early morning)";

const ERR_NO_TAXI: &str = "cannot determine taxi duration";
const ERR_NO_BASELINE: &str = "no baseline duration available for transit approximation";

/// Normalized upstream point estimates for one estimation call.
///
/// `None` means the upstream returned no value; the availability flags say
/// whether the transit lookup itself succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuteInputs {
    pub time_budget_min: f64,
    pub taxi_duration_min: Option<f64>,
    pub taxi_distance_m: Option<f64>,
    pub bus_wait_min: Option<f64>,
    pub subway_wait_min: Option<f64>,
    pub bus_available: bool,
    pub subway_available: bool,
    /// Local hour of day, 0-23
    pub current_hour: u32,
}

impl Default for CommuteInputs {
    fn default() -> Self {
        Self {
            time_budget_min: 0.0,
            taxi_duration_min: None,
            taxi_distance_m: None,
            bus_wait_min: None,
            subway_wait_min: None,
            bus_available: true,
            subway_available: true,
            current_hour: 12,
        }
    }
}

/// Taxi model: drive time plus a fixed call/boarding overhead, low variance.
struct TaxiProfile {
    overhead_min: f64,
    std_floor_min: f64,
    std_ratio: f64,
    long_distance_m: f64,
}

const TAXI: TaxiProfile = TaxiProfile {
    overhead_min: 3.0,
    std_floor_min: 3.0,
    std_ratio: 0.18,
    long_distance_m: 12_000.0,
};

/// Transit model: access walk + wait + in-vehicle time derived from the drive time.
struct TransitProfile {
    mode: TransportMode,
    access_min: f64,
    fallback_wait_min: f64,
    in_vehicle_factor: f64,
    in_vehicle_offset_min: f64,
    std_floor_min: f64,
    std_ratio: f64,
    long_wait_min: f64,
}

const BUS: TransitProfile = TransitProfile {
    mode: TransportMode::Bus,
    access_min: 4.0,
    fallback_wait_min: 8.0,
    in_vehicle_factor: 1.55,
    in_vehicle_offset_min: 6.0,
    std_floor_min: 5.0,
    std_ratio: 0.30,
    long_wait_min: 10.0,
};

const SUBWAY: TransitProfile = TransitProfile {
    mode: TransportMode::Subway,
    access_min: 7.0,
    fallback_wait_min: 6.0,
    in_vehicle_factor: 1.25,
    in_vehicle_offset_min: 5.0,
    std_floor_min: 4.0,
    std_ratio: 0.22,
    long_wait_min: 8.0,
};

/// Mode-specific parameters resolved from the inputs, ready for evaluation.
enum ModeParams {
    Taxi {
        drive_min: f64,
        distance_m: Option<f64>,
    },
    Transit {
        profile: &'static TransitProfile,
        base_drive_min: f64,
        wait_min: Option<f64>,
    },
}

/// Duration distribution and qualifiers before the probability is applied.
struct DurationModel {
    mean: f64,
    std: f64,
    factors: Vec<String>,
    detail: ModeDetail,
}

impl ModeParams {
    fn model(&self, time_budget_min: f64) -> DurationModel {
        match *self {
            ModeParams::Taxi { drive_min, distance_m } => {
                let mean = drive_min + TAXI.overhead_min;
                let std = TAXI.std_floor_min.max(mean * TAXI.std_ratio);

                let mut factors = Vec::new();
                if mean > time_budget_min {
                    factors.push(FACTOR_TIGHT.to_string());
                }
                if distance_m.is_some_and(|d| d > TAXI.long_distance_m) {
                    factors.push(FACTOR_LONG_DISTANCE.to_string());
                }

                DurationModel {
                    mean,
                    std,
                    factors,
                    detail: ModeDetail {
                        base_drive_min: Some(drive_min),
                        ..ModeDetail::default()
                    },
                }
            }
            ModeParams::Transit { profile, base_drive_min, wait_min } => {
                let (wait, wait_estimated) = match wait_min {
                    Some(w) => (w, false),
                    None => (profile.fallback_wait_min, true),
                };
                let in_vehicle = base_drive_min * profile.in_vehicle_factor + profile.in_vehicle_offset_min;
                let mean = profile.access_min + wait + in_vehicle;
                let std = profile.std_floor_min.max(mean * profile.std_ratio);

                let mut factors = Vec::new();
                if wait_estimated {
                    factors.push(FACTOR_NO_LIVE_DATA.to_string());
                }
                if wait >= profile.long_wait_min {
                    factors.push(FACTOR_LONG_WAIT.to_string());
                }
                if mean > time_budget_min {
                    factors.push(FACTOR_TIGHT.to_string());
                }

                let mut detail = ModeDetail {
                    wait_min: Some(wait),
                    in_vehicle_min: Some(in_vehicle),
                    wait_estimated: Some(wait_estimated),
                    ..ModeDetail::default()
                };
                match profile.mode {
                    TransportMode::Subway => detail.walk_to_station_min = Some(profile.access_min),
                    _ => detail.walk_to_stop_min = Some(profile.access_min),
                }

                DurationModel { mean, std, factors, detail }
            }
        }
    }

    fn mode(&self) -> TransportMode {
        match self {
            ModeParams::Taxi { .. } => TransportMode::Taxi,
            ModeParams::Transit { profile, .. } => profile.mode,
        }
    }
}

/// Shared evaluation: every mode's (mean, std) goes through the same CDF.
fn evaluate(params: ModeParams, time_budget_min: f64) -> ModeResult {
    let model = params.model(time_budget_min);
    ModeResult {
        ok: true,
        mode: params.mode(),
        mean_min: model.mean,
        std_min: model.std,
        p_on_time: ontime_prob(time_budget_min, model.mean, model.std),
        factors: model.factors,
        detail: model.detail,
        error: String::new(),
    }
}

fn transit_result(
    profile: &'static TransitProfile,
    inputs: &CommuteInputs,
    available: bool,
    wait_min: Option<f64>,
) -> ModeResult {
    let Some(base_drive_min) = inputs.taxi_duration_min else {
        return ModeResult::unavailable(profile.mode, ERR_NO_BASELINE);
    };

    let early_morning = inputs.current_hour < EARLY_MORNING_END_HOUR;
    if early_morning && (!available || wait_min.is_none()) {
        return ModeResult::not_operating(profile.mode, FACTOR_NOT_OPERATING);
    }

    evaluate(
        ModeParams::Transit { profile, base_drive_min, wait_min },
        inputs.time_budget_min,
    )
}

/// Estimate the on-time probability of taxi, bus and subway.
///
/// Never fails: a mode that cannot be evaluated is reported with `ok=false`
/// and an error message, independently of the other modes. Bus and subway
/// in-vehicle times are approximated from the taxi drive time, so without
/// it all three modes are unavailable.
pub fn compute_probabilities(inputs: &CommuteInputs) -> CommuteProbabilities {
    let taxi = match inputs.taxi_duration_min {
        Some(drive_min) => evaluate(
            ModeParams::Taxi { drive_min, distance_m: inputs.taxi_distance_m },
            inputs.time_budget_min,
        ),
        None => ModeResult::unavailable(TransportMode::Taxi, ERR_NO_TAXI),
    };

    let bus = transit_result(&BUS, inputs, inputs.bus_available, inputs.bus_wait_min);
    let subway = transit_result(&SUBWAY, inputs, inputs.subway_available, inputs.subway_wait_min);

    CommuteProbabilities { taxi, bus, subway }
}
