use dashboard_core::WeatherReport;
use serde::{Deserialize, Serialize};

/// Departure advice when the caller has no recommendation of its own
pub const DEFAULT_DEPART_IN_MIN: i64 = 5;

/// Temperature tiers in °C
const VERY_HOT: f64 = 30.0;
const HOT: f64 = 27.0;
const CHILLY: f64 = 3.0;
const VERY_COLD: f64 = -2.0;
const EXTREME_COLD: f64 = 0.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingInput {
    #[serde(default)]
    pub recommend_depart_in_min: Option<i64>,
    #[serde(default)]
    pub weather: WeatherReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub summary: String,
    pub action_points: Vec<String>,
}

/// Build the going-out briefing: weather warnings first, then departure advice.
pub fn make_briefing(input: &BriefingInput) -> Briefing {
    let weather = &input.weather;
    let depart_in = input.recommend_depart_in_min.unwrap_or(DEFAULT_DEPART_IN_MIN);

    let mut points = Vec::new();

    if weather.is_snow {
        points.push("It is snowing. Take an umbrella and watch for slippery roads.".to_string());
    } else if weather.is_rain {
        points.push("It is raining. Don't forget your umbrella.".to_string());
    }

    if let Some(temp) = weather.temp {
        // whole degrees, truncated toward zero
        let degrees = temp.trunc() as i64;
        if temp >= VERY_HOT {
            points.push(format!("It is {degrees}°C and very hot. Dress light and bring a fan."));
        } else if temp >= HOT {
            points.push(format!("It is {degrees}°C and hot. Dress for the heat."));
        } else if temp <= VERY_COLD {
            points.push(format!(
                "It is {} below zero and very cold. Wear a heavy coat and a scarf.",
                degrees.abs()
            ));
        } else if temp <= CHILLY {
            points.push(format!("It is {degrees}°C and chilly. A coat or padded jacket is a good idea."));
        }
    }

    points.push(format!("Departure recommended in {depart_in} minutes."));

    let summary = if weather.is_rain || weather.is_snow {
        "Rain or snow today. Travel safely."
    } else if weather.temp.is_some_and(|t| t >= VERY_HOT || t <= EXTREME_COLD) {
        "Extreme weather today. Take care of yourself."
    } else {
        "Here is your briefing for heading out today."
    };

    Briefing {
        summary: summary.to_string(),
        action_points: points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(temp: Option<f64>, is_rain: bool, is_snow: bool) -> BriefingInput {
        BriefingInput {
            recommend_depart_in_min: None,
            weather: WeatherReport {
                temp,
                is_rain,
                is_snow,
                ..WeatherReport::default()
            },
        }
    }

    #[test]
    fn test_mild_day_only_departure() {
        let briefing = make_briefing(&input(Some(18.0), false, false));
        assert_eq!(briefing.action_points, vec!["Departure recommended in 5 minutes."]);
        assert_eq!(briefing.summary, "Here is your briefing for heading out today.");
    }

    #[test]
    fn test_snow_takes_precedence_over_rain() {
        let briefing = make_briefing(&input(Some(1.0), true, true));
        assert!(briefing.action_points[0].contains("snowing"));
        assert!(!briefing.action_points.iter().any(|p| p.contains("raining")));
        assert!(briefing.action_points[1].contains("chilly"));
        assert_eq!(briefing.summary, "Rain or snow today. Travel safely.");
    }

    #[test]
    fn test_heat_tiers() {
        assert!(make_briefing(&input(Some(31.2), false, false)).action_points[0].contains("31°C and very hot"));
        assert!(make_briefing(&input(Some(27.0), false, false)).action_points[0].contains("hot"));
        assert_eq!(
            make_briefing(&input(Some(30.0), false, false)).summary,
            "Extreme weather today. Take care of yourself."
        );
    }

    #[test]
    fn test_cold_tiers() {
        let very_cold = make_briefing(&input(Some(-5.7), false, false));
        assert!(very_cold.action_points[0].contains("5 below zero"));
        assert_eq!(very_cold.summary, "Extreme weather today. Take care of yourself.");

        // -1 is chilly, not very cold, but still an extreme-day summary
        let chilly = make_briefing(&input(Some(-1.0), false, false));
        assert!(chilly.action_points[0].contains("chilly"));
        assert_eq!(chilly.summary, "Extreme weather today. Take care of yourself.");
    }

    #[test]
    fn test_custom_departure_and_unknown_temp() {
        let briefing = make_briefing(&BriefingInput {
            recommend_depart_in_min: Some(12),
            weather: WeatherReport::default(),
        });
        assert_eq!(briefing.action_points, vec!["Departure recommended in 12 minutes."]);
    }
}
