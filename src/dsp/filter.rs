use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | constructed by       | passes          | rejects      |
| ----------------- | -------------------- | --------------- | ------------ |
| low-pass          | LPF                  | below cutoff    | above cutoff |
| high-pass         | HPF                  | above cutoff    | below cutoff |
| band-pass         | HPF ∘ LPF (series)   | between cutoffs | outside      |
| notch / band-stop | LPF + HPF (parallel) | outside         | between      |

Coefficients
------------

The caller hands the filter a frequency coefficient

    f = 2·sin(π·fc/fs)

clamped to (F_MIN, F_MAX). The integrators themselves are trapezoidal (TPT),
so the coefficient is converted to the prewarped gain

    g = tan(π·fc/fs) = s / sqrt(1 − s²),   s = f/2

which is exact below the clamp and needs no transcendental per sample. The
damping is k = 1/Q. With f inside (0, 2) and k > 0 the state stays bounded
for any bounded input.
*/

/// Lower bound for the frequency coefficient.
pub const F_MIN: f32 = 0.0001;
/// Upper bound for the frequency coefficient (keeps `1 − s²` away from zero).
pub const F_MAX: f32 = 1.99;
/// Damping never drops below this, i.e. Q never exceeds 1000.
pub const K_MIN: f32 = 0.001;
/// Damping never exceeds this, i.e. Q never drops below 0.25.
pub const K_MAX: f32 = 4.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SvfOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

impl SvfOutputs {
    #[inline]
    pub fn select(&self, filter_type: FilterType) -> f32 {
        match filter_type {
            FilterType::LowPass => self.lowpass,
            FilterType::HighPass => self.highpass,
            FilterType::BandPass => self.bandpass,
            FilterType::Notch => self.notch,
        }
    }
}

/// Frequency coefficient `2·sin(π·fc/fs)`, clamped into the stable range.
#[inline]
pub fn coefficient(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let f = 2.0 * (PI * cutoff_hz / sample_rate).sin();
    if f.is_finite() {
        f.clamp(F_MIN, F_MAX)
    } else {
        F_MIN
    }
}

/// Damping factor `1/Q`, clamped.
#[inline]
pub fn damping(q: f32) -> f32 {
    if q.is_finite() && q > 0.0 {
        (1.0 / q).clamp(K_MIN, K_MAX)
    } else {
        K_MAX
    }
}

/// Two-integrator state-variable filter.
///
/// Owns only the two integrator memories; cutoff and damping are supplied on
/// every call so one instance can be swept at audio rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svf {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl Svf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one sample with coefficient `f` (see [`coefficient`]) and damping `k`.
    #[inline]
    pub fn process(&mut self, sample: f32, f: f32, k: f32) -> SvfOutputs {
        let s = 0.5 * f.clamp(F_MIN, F_MAX);
        let g = s / (1.0 - s * s).sqrt();
        let k = k.clamp(K_MIN, K_MAX);

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        if !(self.ic1eq.is_finite() && self.ic2eq.is_finite()) {
            self.reset();
        }

        SvfOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter a buffer in place at a fixed cutoff.
    pub fn render(
        &mut self,
        buffer: &mut [f32],
        filter_type: FilterType,
        cutoff_hz: f32,
        q: f32,
        sample_rate: f32,
    ) {
        let f = coefficient(cutoff_hz, sample_rate);
        let k = damping(q);

        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, f, k).select(filter_type);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Integrator memories `(ic1eq, ic2eq)`.
    pub fn state(&self) -> (f32, f32) {
        (self.ic1eq, self.ic2eq)
    }
}
