/// Running light dose of the current measurement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Exposure {
    /// Sum of `reading * step` over all ticks so far.
    pub accumulated: f32,
    /// Seconds integrated so far.
    pub elapsed_secs: u32,
    /// Ticks left at the last reading's rate, negative once the target is
    /// passed. `None` when the last reading gave no light to divide by.
    pub remaining: Option<f32>,
}

impl Exposure {
    /// Compared in `f64`, which holds every `u32` exactly.
    pub fn exceeds(&self, target: u32) -> bool {
        f64::from(self.accumulated) > f64::from(target)
    }
}

/// Folds one sensor reading per tick into an [`Exposure`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightIntegrator {
    step_secs: u32,
}

impl LightIntegrator {
    pub const fn new(step_secs: u32) -> Self {
        Self { step_secs }
    }

    pub const fn step_secs(&self) -> u32 {
        self.step_secs
    }

    /// Applies one tick. The estimate uses the dose accumulated before this
    /// tick's reading is added.
    ///
    /// Readings that are negative or not finite count as darkness so that
    /// `accumulated` never decreases.
    pub fn tick(&self, exposure: &mut Exposure, target: u32, reading: f32) {
        let dose = self.dose(reading);

        exposure.remaining = if dose > 0.0 {
            Some((target as f32 - exposure.accumulated) / dose)
        } else {
            None
        };
        exposure.accumulated += dose;
        exposure.elapsed_secs = exposure.elapsed_secs.saturating_add(self.step_secs);
    }

    fn dose(&self, reading: f32) -> f32 {
        if reading.is_finite() && reading > 0.0 {
            reading * self.step_secs as f32
        } else {
            0.0
        }
    }
}
