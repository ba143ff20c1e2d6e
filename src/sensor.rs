/// Ambient light source polled once per integration tick.
///
/// Units are up to the implementation but must match the units the exposure
/// target is typed in.
pub trait LightSensor {
    type Error: core::fmt::Debug;

    fn read(&mut self) -> Result<f32, Self::Error>;
}

impl<T: LightSensor + ?Sized> LightSensor for &mut T {
    type Error = T::Error;

    fn read(&mut self) -> Result<f32, Self::Error> {
        T::read(self)
    }
}

const ADC_VOLTAGE_RANGE: f32 = 3.3;
const ADC_MAX: f32 = 4095.;

/// Converts a raw 12-bit ADC count from the photoresistor divider to lux.
pub fn analog_to_lux(analog_value: f32) -> f32 {
    let volts = analog_value * ADC_VOLTAGE_RANGE / ADC_MAX;
    let amps = volts / 10_000.0; // resistor has 10k Ohm
    let microamps = amps * 1_000_000.;
    microamps * 2.0
}
