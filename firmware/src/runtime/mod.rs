use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level, Output, Pull, Speed};
use embassy_sync::channel::Channel;

use crate::control::TestQueue;
use crate::rig::RigDriver;
use testrig_core::bridge::EdgeBridge;
use testrig_core::plans::ALL_TEST_KINDS;

mod button_task;
mod session_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static EDGE_BRIDGE: EdgeBridge = EdgeBridge::new();
pub(super) static TEST_QUEUE: TestQueue = Channel::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA5, PB0, EXTI0, ..
    } = hal::init(config);

    let button = ExtiInput::new(PB0, EXTI0, Pull::Up);
    let rig = RigDriver::new(Output::new(PA5, Level::Low, Speed::Low));

    let sender = TEST_QUEUE.sender();
    for kind in ALL_TEST_KINDS {
        sender.try_send(kind).expect("test queue seeded past capacity");
    }

    spawner
        .spawn(button_task::run(button, &EDGE_BRIDGE))
        .expect("failed to spawn button task");
    spawner
        .spawn(session_task::run(TEST_QUEUE.receiver(), &EDGE_BRIDGE, rig))
        .expect("failed to spawn session task");

    core::future::pending::<()>().await;
}
