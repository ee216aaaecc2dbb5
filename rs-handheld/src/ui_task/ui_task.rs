extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;

use crate::board::{
    Cst816s, DisplayHardwareInterface, TouchHardwareInterface, BACKLIGHT_PCT,
    BOARD_CONFIG, DISPLAY_HEIGHT, DISPLAY_ROTATION, DISPLAY_WIDTH,
};
use crate::ui_task::extensions::PrintableWindowEvent;
use crate::ui_task::platform::HandheldPlatform;
use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::peripherals::{self, PWM0};
use embassy_nrf::pwm::{self, SimplePwm};
use embassy_nrf::twim::{self, Frequency};
use embassy_nrf::{bind_interrupts, spim};
use embassy_time::{Delay, Duration, Instant, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use gc9a01::mode::DisplayConfiguration;
use gc9a01::prelude::DisplayResolution240x240;
use gc9a01::{Gc9a01, SPIDisplayInterface};
// Display info: https://www.buydisplay.com/240x240-round-ips-tft-lcd-display-1-28-capacitive-touch-circle-screen
use rs_handheld_bridge::smoke_test::{self, PanelCanvas, SMOKE_TEST_STEPS};
use rs_handheld_bridge::{DisplayBridge, Gc9a01Panel, InputBridge, RawPanel};
use slint::platform::software_renderer::{
    MinimalSoftwareWindow, RepaintBufferType, Rgb565Pixel,
};

slint::include_modules!();

bind_interrupts!(struct Irqs {
    SERIAL2  => twim::InterruptHandler<peripherals::SERIAL2>;
    SPIM4  => spim::InterruptHandler<peripherals::SPIM4>;
});

#[embassy_executor::task]
pub async fn ui_task_runner(
    display_hw: DisplayHardwareInterface<'static>,
    touch_hw: TouchHardwareInterface<'static>,
) {
    info!("Hello UI task...");

    let config = BOARD_CONFIG;
    if let Err(e) = config.validate() {
        error!("Invalid board configuration => {}", e);
        return;
    }

    info!("Initializing display & touch...");
    let mut backlight = SimplePwm::new_1ch(display_hw.blk.pwm, display_hw.blk.pin);
    backlight.set_prescaler(pwm::Prescaler::Div128);
    backlight.set_max_duty(1024);
    backlight.set_ch0_drive(OutputDrive::HighDrive);
    set_display_brightness(&mut backlight, 0);

    let mut display_reset = Output::new(display_hw.reset, Level::Low, OutputDrive::Standard);
    let display_dc = Output::new(display_hw.dc, Level::Low, OutputDrive::HighDrive);
    let mut touch_enable = Output::new(
        touch_hw.level_shifter_enable,
        Level::Low,
        OutputDrive::Standard,
    );
    let touch_reset = Output::new(touch_hw.reset, Level::High, OutputDrive::Standard);

    let mut spim_config = spim::Config::default();
    spim_config.frequency = spim::Frequency::M32;
    spim_config.mode = spim::MODE_0;
    let spim: spim::Spim<'_, peripherals::SPIM4> = spim::Spim::new_txonly(
        display_hw.spi,
        Irqs,
        display_hw.clk,
        display_hw.mosi,
        spim_config,
    );

    let display_cs = Output::new(display_hw.cs, Level::High, OutputDrive::HighDrive);
    let exclusive_spim = match ExclusiveDevice::new(spim, display_cs, Delay) {
        Ok(device) => device,
        Err(_) => {
            error!("Failed to set up the display SPI device");
            return;
        }
    };
    let interface = SPIDisplayInterface::new(exclusive_spim, display_dc);
    let mut display = Gc9a01::new(interface, DisplayResolution240x240, DISPLAY_ROTATION);

    let mut twim_config = twim::Config::default();
    twim_config.frequency = Frequency::K400;
    twim_config.scl_high_drive = true;
    twim_config.sda_high_drive = true;
    let i2c = twim::Twim::new(touch_hw.i2c, Irqs, touch_hw.sda, touch_hw.scl, twim_config);
    let mut touch_controller = Cst816s::new(
        touch_hw.address,
        i2c,
        touch_reset,
        touch_hw.int,
        display.get_screen_rotation().into(),
        DISPLAY_WIDTH,
        DISPLAY_HEIGHT,
    );

    let mut delay = Delay;

    info!("Enabling touch level shifter...");
    touch_enable.set_high();
    Timer::after(Duration::from_millis(10)).await; // Give the HW some time to settle
    info!("Initializing touch controller...");
    if let Err(e) = touch_controller.init(&mut delay) {
        error!("Failed to initialize the touch controller! => {}", e);
    }

    info!("Resetting display...");
    if let Err(e) = display.reset(&mut display_reset, &mut delay) {
        error!("Display reset failed => {}", Debug2Format(&e));
        return;
    }
    if let Err(e) = display.init(&mut delay) {
        error!("Display init failed => {}", Debug2Format(&e));
        return;
    }
    let mut panel = Gc9a01Panel::new(display);

    info!("Backlight on...");
    set_display_brightness(&mut backlight, BACKLIGHT_PCT);

    if config.smoke_test.enabled {
        let mut canvas = PanelCanvas::new(&mut panel, config.display.swap_bytes);
        if let Err(e) = smoke_test::run(&mut canvas, &mut delay, SMOKE_TEST_STEPS) {
            error!("Smoke test failed => {}", Debug2Format(&e));
        }
    }

    let draw_buffer_len = config.display.draw_buffer_len();
    let mut draw_buffer: Vec<Rgb565Pixel> = Vec::new();
    if draw_buffer.try_reserve_exact(draw_buffer_len).is_err() {
        error!(
            "Could not allocate a draw buffer of {} pixels, giving up",
            draw_buffer_len
        );
        return;
    }
    draw_buffer.resize(draw_buffer_len, Rgb565Pixel(0));

    info!("Creating UI...");

    // `ReusedBuffer`: the frame lives in the panel's own memory, only what changed
    // since the last frame gets re-rendered and sent.
    let window = MinimalSoftwareWindow::new(RepaintBufferType::ReusedBuffer);
    if slint::platform::set_platform(alloc::boxed::Box::new(HandheldPlatform {
        window: window.clone(),
    }))
    .is_err()
    {
        error!("A Slint platform is already set");
        return;
    }

    let ui = match HandheldUi::new() {
        Ok(ui) => ui,
        Err(e) => {
            error!("Unable to create the main window => {}", Debug2Format(&e));
            return;
        }
    };
    ui.on_tapped(|taps| info!("Tapped {} times", taps));
    ui.set_status("Touch the button".into());

    window.set_size(slint::PhysicalSize::new(
        DISPLAY_WIDTH as u32,
        DISPLAY_HEIGHT as u32,
    ));
    if let Err(e) = ui.show() {
        error!("Unable to show the main window => {}", Debug2Format(&e));
        return;
    }

    let mut input = InputBridge::new(&config.touch);

    loop {
        // Let Slint run the timer hooks and update animations.
        slint::platform::update_timers_and_animations();
        let scale_factor = window.scale_factor();

        let next = select(
            touch_controller.wait_event(),
            render_and_idle(
                &window,
                &mut panel,
                &mut draw_buffer,
                config.display.swap_bytes,
            ),
        )
        .await;

        match next {
            Either::First(Ok(sample)) => {
                if let Some(event) = input.handle_sample(sample, Instant::now(), scale_factor) {
                    debug!("Event {}", PrintableWindowEvent(&event));
                    window.dispatch_event(event);
                }
            }
            Either::First(Err(e)) => error!("Touch read error => {}", e),
            Either::Second(()) => {
                match input.check_missed_release(
                    &mut touch_controller,
                    Instant::now(),
                    scale_factor,
                ) {
                    Ok(Some(event)) => {
                        debug!("Event {}", PrintableWindowEvent(&event));
                        window.dispatch_event(event);
                    }
                    Ok(None) => {}
                    Err(e) => error!("Touch re-poll error => {}", e),
                }
            }
        }
    }
}

/// One pass of the UI loop: draw what changed, then sleep until Slint has work again
async fn render_and_idle<P: RawPanel>(
    window: &Rc<MinimalSoftwareWindow>,
    panel: &mut P,
    draw_buffer: &mut [Rgb565Pixel],
    swap_bytes: bool,
) {
    window.draw_if_needed(|renderer| {
        let mut bridge = DisplayBridge::new(panel, draw_buffer, swap_bytes);
        renderer.render_by_line(bridge.lines());
        match bridge.finish() {
            Ok(stats) => trace!("Frame sent as {} areas, {} pixels", stats.areas, stats.pixels),
            Err(e) => error!("Frame flush failed => {}", Debug2Format(&e)),
        }
    });

    let sleep_duration = if !window.has_active_animations() {
        // Try to put the MCU to sleep
        slint::platform::duration_until_next_timer_update().map(|duration| {
            debug!(
                "Sleep until next UI update in {}ms...",
                duration.as_millis()
            );
            Duration::from_millis(duration.as_millis() as u64)
        })
    } else {
        None
    };

    // If Slint doesn't give us time, we give embassy anyways some time to do other stuff
    // at the cost of a slightly less responsive UI
    Timer::after(sleep_duration.unwrap_or(Duration::from_millis(3))).await;
}

fn set_display_brightness(pwm: &mut SimplePwm<'_, PWM0>, brightness_pct: u8) {
    // The PWM output is active low on this board
    let brightness_pct = 100 - brightness_pct.min(100);
    let duty = (((pwm.max_duty() as u32) * (brightness_pct as u32)) / 100) as u16;
    pwm.set_duty(0, duty);
}
