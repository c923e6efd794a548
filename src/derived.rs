//! Quantities calculated from the decoded observations.
//!
//! All temperatures are in degrees F, wind speeds in mph, and relative humidity in percent. Every
//! function gives `None` when an input it needs is missing.
use metfor::{Celsius, Fahrenheit, Quantity};

/// Magnus coefficients.
const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

/// Dew point from temperature and relative humidity.
///
/// There is no dew point for a relative humidity of zero or less.
pub fn dewpoint(temperature: Option<f64>, rh: Option<f64>) -> Option<f64> {
    let (temperature, rh) = (temperature?, rh?);
    if rh <= 0.0 {
        return None;
    }

    let t_c = Celsius::from(Fahrenheit(temperature)).unpack();
    let alpha = MAGNUS_A * t_c / (MAGNUS_B + t_c) + (rh / 100.0).ln();
    let dp_c = MAGNUS_B * alpha / (MAGNUS_A - alpha);

    Some(Fahrenheit::from(Celsius(dp_c)).unpack())
}

/// Wind chill from temperature and wind speed.
///
/// Both inputs are required. Above 50F, or with less than 3 mph of wind, the wind chill is the
/// temperature.
pub fn wind_chill(temperature: Option<f64>, wind_speed: Option<f64>) -> Option<f64> {
    let temperature = temperature?;
    let wind_speed = wind_speed?;

    if temperature > 50.0 || wind_speed < 3.0 {
        return Some(temperature);
    }

    let v = wind_speed.powf(0.16);
    Some(35.74 + 0.6215 * temperature - 35.75 * v + 0.4275 * temperature * v)
}

/// Heat index from temperature and relative humidity.
///
/// Below 80F the heat index is the temperature. Above that the simple form is tried first and
/// the full Rothfusz regression is used only if the simple form reaches 80F.
pub fn heat_index(temperature: Option<f64>, rh: Option<f64>) -> Option<f64> {
    let t = temperature?;
    if t < 80.0 {
        return Some(t);
    }

    let rh = rh?;
    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if simple < 80.0 {
        return Some(simple);
    }

    Some(
        -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
            - 0.224_755_41 * t * rh
            - 0.006_837_83 * t * t
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * t * t * rh
            + 0.000_852_82 * t * rh * rh
            - 0.000_001_99 * t * t * rh * rh,
    )
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_dewpoint() {
        let dp = dewpoint(Some(68.0), Some(50.0)).unwrap();
        assert!(approx_eq(dp, 48.657_73, 1.0e-4), "{}", dp);

        // Saturated air
        let dp = dewpoint(Some(45.2), Some(100.0)).unwrap();
        assert!(approx_eq(dp, 45.2, 1.0e-9), "{}", dp);

        assert_eq!(dewpoint(Some(68.0), Some(0.0)), None);
        assert_eq!(dewpoint(None, Some(50.0)), None);
        assert_eq!(dewpoint(Some(68.0), None), None);
    }

    #[test]
    fn test_wind_chill() {
        assert_eq!(wind_chill(Some(55.0), Some(30.0)), Some(55.0));
        assert_eq!(wind_chill(Some(55.0), None), None);
        assert_eq!(wind_chill(Some(20.0), Some(2.0)), Some(20.0));
        assert_eq!(wind_chill(Some(20.0), None), None);
        assert_eq!(wind_chill(None, Some(10.0)), None);

        let expected =
            35.74 + 0.6215 * 20.0 - 35.75 * 10f64.powf(0.16) + 0.4275 * 20.0 * 10f64.powf(0.16);
        let wc = wind_chill(Some(20.0), Some(10.0)).unwrap();
        assert!(approx_eq(wc, expected, 1.0e-9));
        assert!(approx_eq(wc, 8.854, 1.0e-3), "{}", wc);
    }

    #[test]
    fn test_heat_index() {
        assert_eq!(heat_index(Some(75.0), None), Some(75.0));
        assert_eq!(heat_index(Some(90.0), None), None);
        assert_eq!(heat_index(None, Some(50.0)), None);

        let hi = heat_index(Some(90.0), Some(50.0)).unwrap();
        assert!(approx_eq(hi, 94.597, 1.0e-3), "{}", hi);

        // Dry air keeps the simple form below 80F.
        let hi = heat_index(Some(80.0), Some(10.0)).unwrap();
        assert!(approx_eq(hi, 78.17, 1.0e-9), "{}", hi);
    }
}
