use embassy_stm32::exti::ExtiInput;

use crate::clock;
use testrig_core::bridge::EdgeBridge;
use testrig_core::debounce::{ActiveLevel, DEFAULT_DEBOUNCE_WINDOW, Debouncer};

/// Samples the button on every EXTI edge and publishes validated edges.
///
/// The pull-up wiring makes the pressed level low. All work here is a few
/// comparisons plus two atomic stores, safe for interrupt-driven context.
#[embassy_executor::task]
pub async fn run(mut button: ExtiInput<'static>, bridge: &'static EdgeBridge) -> ! {
    let mut debouncer = Debouncer::new(DEFAULT_DEBOUNCE_WINDOW, ActiveLevel::Low);

    // Idle baseline; produces no event.
    let _ = debouncer.sample(button.is_high(), clock::now());

    loop {
        button.wait_for_any_edge().await;
        if let Some(event) = debouncer.sample(button.is_high(), clock::now()) {
            bridge.publish(event);
        }
    }
}
