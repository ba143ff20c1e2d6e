#![no_std]
#![no_main]

use core::mem::size_of;
use core::pin::pin;

use embassy_executor::Spawner;
use embassy_futures::select::select3;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use esp_backtrace as _;
use esp_hal::analog::adc::{Adc, AdcCalBasic, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::{GpioPin, Input, Level, Output, Pull};
use esp_hal::peripherals::ADC1;
use esp_hal::timer::systimer::SystemTimer;
use esp_println::println;

use exposure_timer::config::{self, TimerConfig};
use exposure_timer::display::Line;
use exposure_timer::sensor::{analog_to_lux, LightSensor};
use exposure_timer::{
    Beeper, Buzzer, ExposureMachine, InputQueue, KeyMatrix, KeypadController, Presenter,
    SharedSession, TextDisplay,
};

type AdcCal = AdcCalBasic<ADC1>;

static SESSION: SharedSession<CriticalSectionRawMutex> = SharedSession::new();
static INPUT: InputQueue<CriticalSectionRawMutex> = InputQueue::new();
static BEEPER: Beeper<CriticalSectionRawMutex> = Beeper::new();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger(config::LOG_LEVEL);

    println!(
        "Exposure timer: step={}s, Session (BSS)={}B, Input queue (BSS)={}B, Beeper (BSS)={}B",
        config::STEP_SECS,
        size_of::<SharedSession<CriticalSectionRawMutex>>(),
        size_of::<InputQueue<CriticalSectionRawMutex>>(),
        size_of::<Beeper<CriticalSectionRawMutex>>(),
    );

    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_hal_embassy::init(SystemTimer::new(peripherals.SYSTIMER).alarm0);

    let timing = TimerConfig::default();

    // Buzzer on GPIO3, driven high for sound.
    let buzzer = Buzzer::new(Output::new(peripherals.GPIO3, Level::Low), Delay, timing);
    if let Err(err) = spawner.spawn(run_buzzer(buzzer)) {
        log::error!("buzzer task not started: {:?}", err);
    }

    // Photoresistor divider on GPIO2.
    let mut adc1_config = AdcConfig::new();
    let pin = adc1_config.enable_pin_with_cal::<_, AdcCal>(peripherals.GPIO2, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc1_config);
    let sensor = Mutex::<CriticalSectionRawMutex, _>::new(PhotoResistor { adc, pin });

    // 4x4 membrane keypad: rows driven, columns pulled up.
    let rows = [
        Output::new(peripherals.GPIO10, Level::High),
        Output::new(peripherals.GPIO11, Level::High),
        Output::new(peripherals.GPIO12, Level::High),
        Output::new(peripherals.GPIO13, Level::High),
    ];
    let cols = [
        Input::new(peripherals.GPIO22, Pull::Up),
        Input::new(peripherals.GPIO23, Pull::Up),
        Input::new(peripherals.GPIO24, Pull::Up),
        Input::new(peripherals.GPIO25, Pull::Up),
    ];
    let keypad = KeyMatrix::new(rows, cols);

    println!("Hardware ready");

    let mut machine = ExposureMachine::new(&SESSION, &INPUT, &BEEPER, &sensor, Delay, &timing);
    let controller = KeypadController::new(&INPUT, &BEEPER);
    let presenter = Presenter::new(&SESSION, &sensor);

    let mut control = pin!(async {
        match machine.run().await {
            Ok(never) => match never {},
            Err(err) => {
                // Leave the last values on screen.
                log::error!("exposure loop stopped: {}", err);
                core::future::pending::<()>().await
            }
        }
    });
    let mut keys = pin!(controller.run(keypad, Delay, timing.keypad_poll_ms));
    let mut screen = pin!(presenter.run(
        ConsoleDisplay::default(),
        Delay,
        timing.display_interval_ms
    ));

    loop {
        select3(&mut control, &mut keys, &mut screen).await;
    }
}

#[embassy_executor::task]
async fn run_buzzer(mut buzzer: Buzzer<Output<'static>, Delay>) -> ! {
    buzzer.run(&BEEPER).await
}

#[derive(Debug)]
struct AdcReadFailed;

struct PhotoResistor {
    adc: Adc<'static, ADC1>,
    pin: AdcPin<GpioPin<2>, ADC1, AdcCal>,
}

impl LightSensor for PhotoResistor {
    type Error = AdcReadFailed;

    fn read(&mut self) -> Result<f32, AdcReadFailed> {
        let raw = nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|_| AdcReadFailed)?;
        Ok(analog_to_lux(raw.into()))
    }
}

/// Serial console stand-in for the panel: prints a line when it changes.
#[derive(Default)]
struct ConsoleDisplay {
    last: Line,
}

impl TextDisplay for ConsoleDisplay {
    fn show(&mut self, line: &str) {
        if self.last.as_str() == line {
            return;
        }
        println!("{}", line);
        self.last.clear();
        let _ = self.last.push_str(line);
    }
}
