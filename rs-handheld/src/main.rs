#![no_std]
#![no_main]
extern crate alloc;

mod board;
mod ui_task;
use core::ptr::addr_of_mut;

use defmt::*;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{self, Pin as _, Pull};
use embassy_nrf::gpiote;
use embassy_nrf::pac::reset::{self};
use embassy_nrf::peripherals::{self};
use embassy_nrf::twim::{self, Frequency};
use embassy_nrf::{self, pac};
use embassy_nrf::{bind_interrupts, Peripheral};
use embassy_time::Timer;
use embedded_alloc::LlffHeap as Heap;

use {defmt_rtt as _, panic_probe as _};

#[cfg(all(feature = "hw-board-zs", feature = "hw-board-dk"))]
compile_error!("Select exactly one of the `hw-board-*` features");

bind_interrupts!(struct Irqs {
    SERIAL1  => twim::InterruptHandler<peripherals::SERIAL1>;
});

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Slint's runtime plus one tenth of the screen as draw buffer
const HEAP_SIZE: usize = 64 * 1024;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // Initialize the allocator BEFORE you use it
    {
        use core::mem::MaybeUninit;
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        unsafe { HEAP.init(addr_of_mut!(HEAP_MEM) as usize, HEAP_SIZE) }
    }

    let p = embassy_nrf::init(Default::default());

    info!("Hello rs-handheld!");

    let div = pac::clock::vals::Hclk::DIV1; // Desired Main clock divider (aka 128MHz)
    pac::CLOCK.hfclkctrl().write(|w| w.set_hclk(div));
    let cpu_clock_speed = 128 / (pac::CLOCK.hfclkctrl().read().hclk() as u8 + 1);
    info!("Running at {}MHz", cpu_clock_speed);

    info!("Waking-up NET core...");
    pac::RESET
        .network()
        .forceoff()
        .write(|w| w.set_forceoff(reset::vals::Forceoff::RELEASE));

    info!("Initializing PM...");
    let mut config = twim::Config::default();
    config.frequency = Frequency::K400;
    let mut pm_i2c = twim::Twim::new(p.SERIAL1, Irqs, p.P0_10, p.P0_07, config);
    board::power::enable_display_rail(&mut pm_i2c).await;

    let touch_int: gpiote::InputChannel<'_> = gpiote::InputChannel::new(
        p.GPIOTE_CH0,
        gpio::Input::new(p.P1_00, Pull::Up),
        gpiote::InputChannelPolarity::HiToLo,
    );

    let display_hw = board::DisplayHardwareInterface {
        #[cfg(feature = "hw-board-dk")]
        reset: p.P0_21.degrade(),
        #[cfg(feature = "hw-board-zs")]
        reset: p.P0_03.degrade(),
        blk: board::BacklightControl {
            pin: p.P0_23.degrade(),
            pwm: p.PWM0.into_ref(),
        },
        cs: p.P0_12.degrade(),
        dc: p.P0_11.degrade(),
        mosi: p.P0_09.degrade(),
        clk: p.P0_08.degrade(),
        spi: p.SPIM4.into_ref(),
    };

    let touch_hw = board::TouchHardwareInterface {
        address: board::CST816S_ADDRESS,
        level_shifter_enable: p.P1_01.degrade(),
        reset: p.P0_20.degrade(),
        #[cfg(feature = "hw-board-dk")]
        scl: p.P1_08.degrade(),
        #[cfg(feature = "hw-board-zs")]
        scl: p.P1_03.degrade(),
        #[cfg(feature = "hw-board-dk")]
        sda: p.P1_07.degrade(),
        #[cfg(feature = "hw-board-zs")]
        sda: p.P1_02.degrade(),
        int: touch_int,
        i2c: p.SERIAL2.into_ref(),
    };

    info!("Spawning UI task...");
    unwrap!(spawner.spawn(ui_task::ui_task_runner(display_hw, touch_hw)));

    loop {
        trace!("Main loop has still nothing to do...");
        Timer::after_secs(10).await;
    }
}
