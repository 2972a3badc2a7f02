//! STM32F103 Blue Pill Solar-System Orrery
//! =============================================================================================
//!
//! Date			Author          Notes
//! 18/10/2026	    YHY             Initial release
//!
//!==============================================================================================
//!
//! Shows the eight planets on their orbits around the sun for "now" plus a
//! day offset chosen with the buttons.
//!
//! Hardware Connections:
//!   OLED Display -> Blue Pill
//!      GND  -> GND
//!      VCC  -> 5V
//!      SDA  -> PB7
//!      SCL  -> PB6
//!
//!   Buttons (to GND, internal pull-up):
//!      ADVANCE -> PB12
//!      RETARD  -> PB13
//!      MODE    -> PB14
//!      QUIT    -> PB15
//!
//! Features:
//! 1. Planet positions from mean orbital elements
//! 2. Hold ADVANCE/RETARD to move the date, accelerating while held
//! 3. MODE toggles the red night palette
//! 4. Software RTC refreshed into the display hourly
//! 5. Onboard LED heartbeat indicator

#![no_std]
#![no_main]

use defmt_rtt as _; // Global logger
use embassy_executor::Spawner;
use embassy_stm32::{
    bind_interrupts,
    gpio::{Input, Level, Output, Pull, Speed},
    i2c::{self, ErrorInterruptHandler, EventInterruptHandler},
    peripherals,
    time::Hertz,
};
use embassy_sync::{
    blocking_mutex::raw::ThreadModeRawMutex,
    channel::{Channel, Receiver, Sender},
};
use embassy_time::{Ticker, Timer};
use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::Rectangle};
use orrery::{
    CalendarDateTime, ClockSource, FrameController, InputSource, KeplerEphemeris, OrreryConfig,
    SoftRtc, TickOutcome,
    canvas::{FlushTarget, GraphicsCanvas, to_binary},
    hardware::gpio_button::{ButtonPanel, GpioButton},
};
use panic_probe as _; // Panic handler
use ssd1306::{I2CDisplayInterface, Ssd1306, mode::BufferedGraphicsMode, prelude::*};

/// Build-time tunables
const CONFIG: OrreryConfig = OrreryConfig::DEFAULT;

/// Time the RTC starts from until something sets it
const START_TIME: (i32, u32, u32, u32, u32, u32) = (2025, 7, 20, 18, 0, 0);

/// Pause after a frame so the RTC task gets to run between back-to-back frames
const FRAME_GAP_MS: u64 = 20;

// Channel for publishing RTC time to the display task
static RTC_CHANNEL: Channel<ThreadModeRawMutex, CalendarDateTime, 2> = Channel::new();

// Channel for setting the RTC
static RTC_SET_CHANNEL: Channel<ThreadModeRawMutex, CalendarDateTime, 1> = Channel::new();

type Panel = ButtonPanel<
    GpioButton<Input<'static>>,
    GpioButton<Input<'static>>,
    GpioButton<Input<'static>>,
    GpioButton<Input<'static>>,
>;

type Oled<DI> = Ssd1306<DI, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// SSD1306 in buffered mode, flushed once per frame
struct OledPanel<DI>(Oled<DI>);

impl<DI: WriteOnlyDataCommand> Dimensions for OledPanel<DI> {
    fn bounding_box(&self) -> Rectangle {
        self.0.bounding_box()
    }
}

impl<DI: WriteOnlyDataCommand> DrawTarget for OledPanel<DI> {
    type Color = BinaryColor;
    type Error = <Oled<DI> as DrawTarget>::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<BinaryColor>>,
    {
        self.0.draw_iter(pixels)
    }

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        DrawTarget::clear(&mut self.0, color)
    }
}

impl<DI: WriteOnlyDataCommand> FlushTarget for OledPanel<DI> {
    fn flush_frame(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

#[derive(Debug, defmt::Format)]
enum ClockError {
    /// A previous set request has not been picked up yet
    SetPending,
}

/// Clock source fed by the RTC task
///
/// Keeps the latest published time; reads would block until the first one
/// arrives.
struct ChannelClock {
    updates: Receiver<'static, ThreadModeRawMutex, CalendarDateTime, 2>,
    setter: Sender<'static, ThreadModeRawMutex, CalendarDateTime, 1>,
    latest: Option<CalendarDateTime>,
}

impl ClockSource for ChannelClock {
    type Error = ClockError;

    fn read(&mut self) -> nb::Result<CalendarDateTime, ClockError> {
        while let Ok(now) = self.updates.try_receive() {
            self.latest = Some(now);
        }
        self.latest.ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, value: CalendarDateTime) -> Result<(), ClockError> {
        self.setter
            .try_send(value)
            .map_err(|_| ClockError::SetPending)
    }
}

/// Main application entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // Initialize peripherals with default configuration
    let p = embassy_stm32::init(Default::default());

    // Bind I2C interrupt handlers
    bind_interrupts!(struct Irqs {
        I2C1_EV => EventInterruptHandler<peripherals::I2C1>;
        I2C1_ER => ErrorInterruptHandler<peripherals::I2C1>;
    });

    // Configure I2C peripheral at 400kHz
    let i2c = i2c::I2c::new(
        p.I2C1,
        p.PB6,
        p.PB7,
        Irqs,
        p.DMA1_CH6,
        p.DMA1_CH7,
        Hertz::khz(400),
        Default::default(),
    );

    // Buttons pull to GND
    let buttons = ButtonPanel::new(
        GpioButton::new(Input::new(p.PB12, Pull::Up)),
        GpioButton::new(Input::new(p.PB13, Pull::Up)),
        GpioButton::new(Input::new(p.PB14, Pull::Up)),
        GpioButton::new(Input::new(p.PB15, Pull::Up)),
    );

    let mut clock = ChannelClock {
        updates: RTC_CHANNEL.receiver(),
        setter: RTC_SET_CHANNEL.sender(),
        latest: None,
    };

    let (year, month, day, hour, minute, second) = START_TIME;
    match CalendarDateTime::new(year, month, day, hour, minute, second) {
        Ok(start) => {
            if let Err(err) = clock.write(start) {
                defmt::warn!("RTC not set: {}", err);
            }
        }
        Err(err) => defmt::error!("Invalid start time: {}", err),
    }

    // Spawn RTC update task
    _spawner
        .spawn(rtc_update(
            RTC_CHANNEL.sender(),
            RTC_SET_CHANNEL.receiver(),
            embassy_time::Duration::from_millis(1000), // Update interval
        ))
        .unwrap();

    // Spawn orrery display task
    _spawner.spawn(orrery_display(i2c, buttons, clock)).unwrap();

    // Configure onboard LED (PC13) as heartbeat indicator
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);
    let mut ticker = Ticker::every(embassy_time::Duration::from_millis(500));

    // Main heartbeat loop - blinks onboard LED
    loop {
        led.set_low(); // LED on
        ticker.next().await;
        led.set_high(); // LED off
        ticker.next().await;
    }
}

/// Orrery Display Task
///
/// Responsibilities:
/// 1. Initialize the SSD1306 display
/// 2. Sample the buttons once per tick
/// 3. Run the frame controller and sleep as it asks
/// 4. Blank the display on quit
#[embassy_executor::task]
async fn orrery_display(
    i2c: i2c::I2c<'static, embassy_stm32::mode::Async>,
    mut buttons: Panel,
    clock: ChannelClock,
) {
    // Initialize display interface and controller
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    if display.init().is_err() {
        defmt::error!("SSD1306 init failed");
        return;
    }

    let mut canvas = GraphicsCanvas::new(OledPanel(display), to_binary);
    let mut controller = FrameController::new(CONFIG, clock, KeplerEphemeris);
    defmt::info!("Orrery started: {}", CONFIG);

    loop {
        match controller.tick(buttons.sample(), &mut canvas) {
            TickOutcome::Rendered => {
                defmt::debug!(
                    "Frame {} offset {} mode {}",
                    controller.displayed_date(),
                    controller.state().offset(),
                    controller.state().display_mode()
                );
                Timer::after_millis(FRAME_GAP_MS).await;
            }
            TickOutcome::Idle { sleep_ms } => Timer::after_millis(u64::from(sleep_ms)).await,
            TickOutcome::ClockPending { retry_ms } => {
                defmt::debug!("Clock not ready, retry in {} ms", retry_ms);
                Timer::after_millis(u64::from(retry_ms)).await;
            }
            TickOutcome::ClockFailed { retry_ms } => {
                defmt::warn!("Clock read failed, retry in {} ms", retry_ms);
                Timer::after_millis(u64::from(retry_ms)).await;
            }
            TickOutcome::FrameSkipped(fault) => {
                defmt::warn!("Frame skipped: {}", fault);
                Timer::after_millis(u64::from(CONFIG.idle_interval_ms)).await;
            }
            TickOutcome::Quit => {
                defmt::info!("Quit requested");
                if controller.shutdown(&mut canvas).is_err() {
                    defmt::warn!("Display blank failed");
                }
                return;
            }
        }
    }
}

/// Software RTC Management Task
///
/// Responsibilities:
/// 1. Maintain virtual real-time clock
/// 2. Apply set requests
/// 3. Publish the time when it changes
#[embassy_executor::task]
async fn rtc_update(
    rtc_sender: Sender<'static, ThreadModeRawMutex, CalendarDateTime, 2>,
    set_receiver: Receiver<'static, ThreadModeRawMutex, CalendarDateTime, 1>,
    delay: embassy_time::Duration,
) {
    let mut rtc = SoftRtc::new();
    let mut ticker = Ticker::every(delay);
    let mut prev_time = None; // For change detection

    loop {
        rtc.advance_millis(delay.as_millis() as u32);

        if let Ok(value) = set_receiver.try_receive() {
            if rtc.write(value).is_ok() {
                defmt::info!("RTC set to {}", value);
            }
        }

        // Broadcast time updates when changed
        if let Some(now) = rtc.now() {
            if prev_time != Some(now) {
                rtc_sender.clear();
                rtc_sender.send(now).await;
                prev_time = Some(now);
            }
        }

        ticker.next().await;
    }
}
