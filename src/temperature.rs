//! Counts to celsius through a planck radiance model.
//!
//! Raw counts are mapped linearly to the radiance received
//! by the sensor. The radiance reflected off the object,
//! emitted by the atmosphere and emitted by any external
//! optics is then subtracted, and the remaining object
//! radiance is inverted through
//! `radiance = R / (exp(B / T) - F)` to recover `T`.
//!
//! Atmospheric transmission follows Minkina and Dudzik's
//! two-band model, as used by the [Thermimage R library].
//!
//! [Thermimage R library]: //github.com/gtatters/Thermimage/blob/master/R/raw2temp.R
use ndarray::{Array2, Zip};
use serde_derive::*;
use tracing::debug;

use crate::{
    error::{ConversionError, Pixel, Result},
    frame::RawFrame,
    polynomial::horner,
    region::{extract, RegionBounds},
};

const CELSIUS_OFFSET: f64 = 273.15;

/// Parameters of the planck conversion. Temperatures are in
/// kelvin, `Humidity` is a fraction in `[0, 1]` and `Dist` is
/// the object distance in metres.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PlanckParameters {
    #[serde(rename = "Emiss")]
    pub emissivity: f64,
    #[serde(rename = "TRefl")]
    pub reflected_temperature: f64,
    #[serde(rename = "TAtm")]
    pub atmospheric_temperature: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,

    #[serde(rename = "R")]
    pub planck_r: f64,
    #[serde(rename = "B")]
    pub planck_b: f64,
    #[serde(rename = "F")]
    pub planck_f: f64,

    #[serde(rename = "X")]
    pub atmospheric_transmission_x: f64,
    #[serde(rename = "A1")]
    pub atmospheric_transmission_alpha_1: f64,
    #[serde(rename = "A2")]
    pub atmospheric_transmission_alpha_2: f64,
    #[serde(rename = "B1")]
    pub atmospheric_transmission_beta_1: f64,
    #[serde(rename = "B2")]
    pub atmospheric_transmission_beta_2: f64,

    #[serde(rename = "J0")]
    pub counts_offset: f64,
    #[serde(rename = "J1")]
    pub counts_gain: f64,

    #[serde(rename = "Dist")]
    pub distance: f64,
    #[serde(rename = "ExtOpticsTransmission")]
    pub ext_optics_transmission: f64,
    /// Defaults to `TAtm` when unset.
    #[serde(rename = "ExtOpticsTemp", skip_serializing_if = "Option::is_none")]
    pub ext_optics_temperature: Option<f64>,
}

impl Default for PlanckParameters {
    /// Factory calibration of the reference camera, imaged
    /// at 0.8 m in a 20 °C room.
    fn default() -> Self {
        PlanckParameters {
            emissivity: 0.98,
            reflected_temperature: 293.15,
            atmospheric_temperature: 293.15,
            humidity: 0.55,

            planck_r: 17496.486328125,
            planck_b: 1444.5999755859375,
            planck_f: 1.0,

            atmospheric_transmission_x: 1.899999976158142,
            atmospheric_transmission_alpha_1: 0.006568999961018562,
            atmospheric_transmission_alpha_2: 0.012620000168681145,
            atmospheric_transmission_beta_1: -0.00227600010111928,
            atmospheric_transmission_beta_2: -0.006670000031590462,

            counts_offset: 4458.,
            counts_gain: 68.02445983886719,

            distance: 0.8,
            ext_optics_transmission: 1.,
            ext_optics_temperature: None,
        }
    }
}

impl PlanckParameters {
    pub fn ext_optics_temperature(&self) -> f64 {
        self.ext_optics_temperature
            .unwrap_or(self.atmospheric_temperature)
    }

    // R / (exp(B / T) - F)
    fn blackbody_radiance(&self, kelvin: f64) -> f64 {
        self.planck_r / ((self.planck_b / kelvin).exp() - self.planck_f)
    }

    // inverse of above, in celsius
    fn blackbody_temperature(&self, radiance: f64) -> f64 {
        self.planck_b / (self.planck_r / radiance + self.planck_f).ln() - CELSIUS_OFFSET
    }

    /// Water vapour content of the air from relative
    /// humidity and atmospheric temperature.
    pub fn water_vapour(&self) -> f64 {
        const ATMOSPHERIC_SERIES: [f64; 4] = [1.5587, 0.06939, -0.00027816, 0.00000068455];
        let t_atm_c = self.atmospheric_temperature - CELSIUS_OFFSET;
        self.humidity * horner(&ATMOSPHERIC_SERIES, t_atm_c).exp()
    }

    fn atmospheric_affine1(&self, val: f64) -> f64 {
        self.atmospheric_transmission_alpha_1 + self.atmospheric_transmission_beta_1 * val
    }

    fn atmospheric_affine2(&self, val: f64) -> f64 {
        self.atmospheric_transmission_alpha_2 + self.atmospheric_transmission_beta_2 * val
    }

    fn atmospheric_interpolate(&self, val1: f64, val2: f64) -> f64 {
        self.atmospheric_transmission_x * val1 + (1. - self.atmospheric_transmission_x) * val2
    }

    /// Fraction of the object radiance that reaches the
    /// sensor through `Dist` metres of air.
    pub fn atmospheric_transmission(&self) -> f64 {
        let h2o_sqrt = self.water_vapour().sqrt();
        let dist_factor = self.distance.sqrt();
        self.atmospheric_interpolate(
            (-dist_factor * self.atmospheric_affine1(h2o_sqrt)).exp(),
            (-dist_factor * self.atmospheric_affine2(h2o_sqrt)).exp(),
        )
    }

    /// Pseudo radiance of the surroundings, `K2`, in object
    /// radiance units, for a given transmission `tau`.
    pub fn correction_radiance(&self, tau: f64) -> f64 {
        let emiss = self.emissivity;
        let ext_t = self.ext_optics_transmission;

        // reflected environment
        let refl = (1. - emiss) / emiss * self.blackbody_radiance(self.reflected_temperature);
        // atmosphere
        let atm = (1. - tau) / (emiss * tau) * self.blackbody_radiance(self.atmospheric_temperature);
        // external optics
        let optics = (1. - ext_t) / (emiss * tau * ext_t)
            * self.blackbody_radiance(self.ext_optics_temperature());

        refl + atm + optics
    }

    /// Computes the session constants of the conversion.
    /// Fails if the transmission or the correction term is
    /// not a usable number.
    pub fn transform(&self) -> Result<PlanckTransform> {
        let tau = self.atmospheric_transmission();
        if !(tau.is_finite() && tau > 0.) {
            return Err(ConversionError::RadianceDomainError {
                quantity: "Tau",
                value: tau,
                pixel: None,
            });
        }

        let k2 = self.correction_radiance(tau);
        if !k2.is_finite() {
            return Err(ConversionError::RadianceDomainError {
                quantity: "K2",
                value: k2,
                pixel: None,
            });
        }

        debug!(tau, k2, "prepared planck transform");
        Ok(PlanckTransform {
            params: *self,
            tau,
            k2,
        })
    }
}

/// Planck conversion with the per-session constants
/// (`Tau`, `K2`) already computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanckTransform {
    params: PlanckParameters,
    tau: f64,
    k2: f64,
}

impl PlanckTransform {
    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn k2(&self) -> f64 {
        self.k2
    }

    /// Radiance seen by the sensor: `(counts - J0) / J1`.
    pub fn radiance(&self, counts: f64) -> f64 {
        (counts - self.params.counts_offset) / self.params.counts_gain
    }

    fn try_temperature(&self, counts: f64) -> std::result::Result<f64, (&'static str, f64)> {
        let p = &self.params;
        let denominator = self.radiance(counts) / p.emissivity / self.tau - self.k2;
        if !(denominator > 0.) {
            return Err(("denominator", denominator));
        }

        let log_arg = p.planck_r / denominator + p.planck_f;
        if !(log_arg > 0.) {
            return Err(("log argument", log_arg));
        }

        let temp = p.planck_b / log_arg.ln() - CELSIUS_OFFSET;
        if !temp.is_finite() {
            return Err(("temperature", temp));
        }
        Ok(temp)
    }

    /// Temperature in celsius for a single count value, or
    /// NaN if the counts fall outside the invertible range.
    pub fn temperature(&self, counts: f64) -> f64 {
        self.try_temperature(counts).unwrap_or(f64::NAN)
    }

    /// Counts the sensor would report for an object at
    /// `celsius`, under the same conditions.
    pub fn counts(&self, celsius: f64) -> f64 {
        let p = &self.params;
        let object = p.blackbody_radiance(celsius + CELSIUS_OFFSET);
        let radiance = (object + self.k2) * p.emissivity * self.tau;
        radiance * p.counts_gain + p.counts_offset
    }

    /// Converts the `bounds` region of `frame` to celsius.
    ///
    /// Fails with [`ConversionError::RadianceDomainError`] at
    /// the first pixel (row-major) whose counts cannot be
    /// inverted.
    pub fn convert(&self, frame: &RawFrame, bounds: &RegionBounds) -> Result<Array2<f64>> {
        let counts = extract(frame.samples(), frame.width(), frame.height(), bounds)?;
        let temps = Zip::indexed(&counts).par_map_collect(|(row, col), &raw| {
            self.try_temperature(raw)
                .map_err(|(quantity, value)| ConversionError::RadianceDomainError {
                    quantity,
                    value,
                    pixel: Some(Pixel {
                        row: bounds.row_low + row,
                        col: bounds.col_low + col,
                        counts: raw,
                    }),
                })
        });

        let mut field = Array2::zeros(counts.raw_dim());
        for (t, temp) in field.iter_mut().zip(temps.iter()) {
            *t = temp.clone()?;
        }
        Ok(field)
    }
}

/// Converts the `bounds` region of `frame` to celsius,
/// computing the session constants for this call only. Use
/// [`PlanckParameters::transform`] to reuse them across
/// frames.
pub fn convert_planck(
    frame: &RawFrame,
    bounds: &RegionBounds,
    params: &PlanckParameters,
) -> Result<Array2<f64>> {
    params.transform()?.convert(frame, bounds)
}

/// Pure planck inversion of an object radiance, without
/// any atmospheric or emissivity correction.
pub fn blackbody_temperature(params: &PlanckParameters, radiance: f64) -> f64 {
    params.blackbody_temperature(radiance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transparent_params() -> PlanckParameters {
        PlanckParameters {
            emissivity: 1.,
            atmospheric_transmission_x: 1.,
            atmospheric_transmission_alpha_1: 0.,
            atmospheric_transmission_beta_1: 0.,
            ext_optics_transmission: 1.,
            ..Default::default()
        }
    }

    #[test]
    fn reference_atmosphere_is_nearly_transparent() -> anyhow::Result<()> {
        let params = PlanckParameters::default();
        let h2o = params.water_vapour();
        assert!((h2o - 9.42).abs() < 0.01, "h2o = {}", h2o);

        let t = params.transform()?;
        assert!(t.tau() > 0.99 && t.tau() < 1., "tau = {}", t.tau());
        assert!(t.k2() > 3. && t.k2() < 4., "k2 = {}", t.k2());
        Ok(())
    }

    #[test]
    fn ext_optics_temperature_defaults_to_atmosphere() {
        let mut params = PlanckParameters::default();
        params.atmospheric_temperature = 300.;
        assert_eq!(params.ext_optics_temperature(), 300.);
        params.ext_optics_temperature = Some(310.);
        assert_eq!(params.ext_optics_temperature(), 310.);
    }

    #[test]
    fn reduces_to_pure_planck_inversion() -> anyhow::Result<()> {
        let params = transparent_params();
        let t = params.transform()?;
        assert_eq!(t.tau(), 1.);
        assert_eq!(t.k2(), 0.);

        let samples: Vec<u16> = vec![5000, 9000, 14000, 20000, 30000, 65535];
        let frame = RawFrame::new(3, 2, samples.clone())?;
        let field = convert_planck(&frame, &RegionBounds::full(3, 2), &params)?;

        for (&t, &raw) in field.iter().zip(samples.iter()) {
            let radiance = (raw as f64 - params.counts_offset) / params.counts_gain;
            let expected =
                params.planck_b / (params.planck_r / radiance + params.planck_f).ln() - 273.15;
            assert!((t - expected).abs() < 1e-9, "{} vs {}", t, expected);
            assert!((t - blackbody_temperature(&params, radiance)).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn recovers_known_object_temperature() -> anyhow::Result<()> {
        let params = PlanckParameters::default();
        let t = params.transform()?;
        for &celsius in [0., 25., 36.6, 80.].iter() {
            let counts = t.counts(celsius);
            assert!((t.temperature(counts) - celsius).abs() < 1e-6);
        }

        let hot = t.counts(30.).round() as u16;
        let frame = RawFrame::new(2, 2, vec![hot; 4])?;
        let field = t.convert(&frame, &RegionBounds::full(2, 2))?;
        for &v in field.iter() {
            assert!((v - 30.).abs() < 0.05, "temperature {}", v);
        }
        Ok(())
    }

    #[test]
    fn warmer_objects_read_hotter() -> anyhow::Result<()> {
        let t = PlanckParameters::default().transform()?;
        let mut last = f64::NEG_INFINITY;
        for counts in (8000..60000).step_by(1000) {
            let temp = t.temperature(counts as f64);
            assert!(temp > last);
            last = temp;
        }
        Ok(())
    }

    #[test]
    fn counts_below_offset_fail_with_pixel() -> anyhow::Result<()> {
        let params = PlanckParameters::default();
        let mut samples = vec![20000u16; 12];
        samples[7] = 0;
        let frame = RawFrame::new(4, 3, samples)?;
        let bounds = RegionBounds::new(1, 3, 1, 4);

        match convert_planck(&frame, &bounds, &params) {
            Err(ConversionError::RadianceDomainError {
                quantity,
                value,
                pixel: Some(pixel),
            }) => {
                assert_eq!(quantity, "denominator");
                assert!(value < 0.);
                assert_eq!((pixel.row, pixel.col, pixel.counts), (1, 3, 0.));
            }
            other => panic!("expected domain error, got {:?}", other),
        }

        assert!(params.transform()?.temperature(0.).is_nan());

        // the bad pixel outside the region does not matter
        let field = convert_planck(&frame, &RegionBounds::new(0, 1, 0, 4), &params)?;
        assert!(field.iter().all(|t| t.is_finite()));
        Ok(())
    }

    fn domain_failure(
        params: &PlanckParameters,
        frame: &RawFrame,
        bounds: &RegionBounds,
    ) -> (&'static str, f64, Pixel) {
        match convert_planck(frame, bounds, params) {
            Err(ConversionError::RadianceDomainError {
                quantity,
                value,
                pixel: Some(pixel),
            }) => (quantity, value, pixel),
            other => panic!("expected domain error, got {:?}", other),
        }
    }

    #[test]
    fn negative_log_argument_fails_with_pixel() -> anyhow::Result<()> {
        let params = PlanckParameters {
            planck_f: -1000.,
            ..Default::default()
        };
        let t = params.transform()?;
        assert!(t.radiance(20000.) / params.emissivity / t.tau() - t.k2() > 0.);
        assert!(t.temperature(20000.).is_nan());

        let frame = RawFrame::new(3, 2, vec![20000; 6])?;
        let (quantity, value, pixel) = domain_failure(&params, &frame, &RegionBounds::new(1, 2, 1, 3));
        assert_eq!(quantity, "log argument");
        assert!(value < -900. && value > -950., "log argument = {}", value);
        assert_eq!((pixel.row, pixel.col, pixel.counts), (1, 1, 20000.));
        Ok(())
    }

    #[test]
    fn infinite_temperature_fails_with_pixel() -> anyhow::Result<()> {
        // radiance == R and F == 0 puts the logarithm at ln(1) == 0
        let params = PlanckParameters {
            planck_r: 20000.,
            planck_f: 0.,
            counts_offset: 0.,
            counts_gain: 1.,
            ..transparent_params()
        };
        let t = params.transform()?;
        assert_eq!((t.tau(), t.k2()), (1., 0.));
        assert!(t.temperature(20000.).is_nan());
        assert!(t.temperature(10000.).is_finite());

        let frame = RawFrame::new(2, 2, vec![10000, 10000, 10000, 20000])?;
        let (quantity, value, pixel) = domain_failure(&params, &frame, &RegionBounds::full(2, 2));
        assert_eq!(quantity, "temperature");
        assert_eq!(value, f64::INFINITY);
        assert_eq!((pixel.row, pixel.col, pixel.counts), (1, 1, 20000.));
        Ok(())
    }

    #[test]
    fn reports_first_failure_in_row_order() -> anyhow::Result<()> {
        let frame = RawFrame::new(3, 2, vec![20000, 20000, 0, 0, 20000, 20000])?;
        let (quantity, _, pixel) =
            domain_failure(&PlanckParameters::default(), &frame, &RegionBounds::full(3, 2));
        assert_eq!(quantity, "denominator");
        assert_eq!((pixel.row, pixel.col), (0, 2));
        Ok(())
    }

    #[test]
    fn opaque_optics_are_rejected_up_front() {
        let params = PlanckParameters {
            ext_optics_transmission: 0.,
            ..Default::default()
        };
        match params.transform() {
            Err(ConversionError::RadianceDomainError {
                quantity, pixel, ..
            }) => {
                assert_eq!(quantity, "K2");
                assert!(pixel.is_none());
            }
            other => panic!("expected K2 failure, got {:?}", other),
        }

        let params = PlanckParameters {
            atmospheric_transmission_x: 0.,
            atmospheric_transmission_alpha_2: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            params.transform(),
            Err(ConversionError::RadianceDomainError { quantity: "Tau", .. })
        ));
    }

    #[test]
    fn parameters_from_json() -> anyhow::Result<()> {
        let params: PlanckParameters =
            serde_json::from_str(r#"{"Emiss": 0.95, "TAtm": 300.0, "Dist": 2.5}"#)?;
        assert_eq!(params.emissivity, 0.95);
        assert_eq!(params.distance, 2.5);
        assert_eq!(params.ext_optics_temperature(), 300.);
        assert_eq!(params.planck_r, PlanckParameters::default().planck_r);
        Ok(())
    }
}
