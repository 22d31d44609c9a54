//! Device state and the two execution contexts that drive it
//!
//! [`Lightpainter`] owns everything mutable: LED, presets, gesture state
//! and the transition engine. [`SharedLightpainter`] wraps it in a
//! critical-section mutex so the PWM overflow interrupt and the main loop
//! never observe each other's partial updates.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::{InputPin, OutputPin};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::LedOutput;
use crate::adb::touchpad::PointerSample;
use crate::adb::{AdbBus, AdbError, MAX_RESPONSE, TickCounter};
use crate::color::Hsv;
use crate::config::LightpainterConfig;
use crate::input::{DragGesture, InputController};
use crate::scheduler::OverflowPrescaler;
use crate::transition::TransitionEngine;

/// Failure of one main-loop step; the step is skipped and the loop goes on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError<E> {
    /// No [`Lightpainter`] installed yet
    Uninitialized,
    /// The touchpad poll failed
    Bus(AdbError<E>),
    /// The touchpad answered with fewer bytes than an absolute report
    ShortReport(usize),
}

impl<E: core::fmt::Debug> core::fmt::Display for ServiceError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ServiceError::Uninitialized => write!(f, "lightpainter not installed"),
            ServiceError::Bus(err) => write!(f, "touchpad poll failed: {err}"),
            ServiceError::ShortReport(len) => write!(f, "touchpad report too short: {len} bytes"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for ServiceError<E> {}

/// Lightpainter - the main orchestrator
pub struct Lightpainter<L: LedOutput, const N: usize> {
    led: L,
    input: InputController<N>,
    transitions: TransitionEngine<N>,
    prescaler: OverflowPrescaler,
    /// Button mask seen on the previous main-loop step
    buttons: u8,
}

impl<L: LedOutput, const N: usize> Lightpainter<L, N> {
    /// Create the state with default presets and no fade running
    pub const fn new(led: L, config: &LightpainterConfig) -> Self {
        Self {
            led,
            input: InputController::new(config),
            transitions: TransitionEngine::new(config.default_velocity),
            prescaler: OverflowPrescaler::new(),
            buttons: 0,
        }
    }

    /// Count one PWM overflow, ticking the transition engine every tenth
    ///
    /// Returns `true` if the engine was ticked.
    pub fn on_pwm_overflow(&mut self) -> bool {
        if !self.prescaler.on_overflow() {
            return false;
        }
        self.tick();
        true
    }

    /// Run one transition step, returning the color written if a fade is running
    pub fn tick(&mut self) -> Option<Hsv> {
        self.transitions.tick(self.input.presets(), &mut self.led)
    }

    /// Apply a freshly read button mask, acting only on changes
    pub fn update_buttons(&mut self, mask: u8) {
        if mask == self.buttons {
            return;
        }
        self.input
            .button_change(self.buttons, mask, &mut self.transitions, &mut self.led);
        self.buttons = mask;
    }

    /// Feed one touchpad sample; returns the gesture step it produced
    pub fn handle_sample(&mut self, sample: PointerSample) -> Option<DragGesture> {
        let gesture = self.input.track(sample, self.buttons)?;
        self.drag_action(&gesture);
        Some(gesture)
    }

    /// Apply one gesture step to the presets, fade and LED
    pub fn drag_action(&mut self, gesture: &DragGesture) {
        self.input
            .drag_action(gesture, &mut self.transitions, &mut self.led);
    }

    /// LED output
    pub fn led(&self) -> &L {
        &self.led
    }

    /// LED output, mutably
    pub fn led_mut(&mut self) -> &mut L {
        &mut self.led
    }

    /// Presets and gesture state
    pub fn input(&self) -> &InputController<N> {
        &self.input
    }

    /// Presets and gesture state, mutably
    pub fn input_mut(&mut self) -> &mut InputController<N> {
        &mut self.input
    }

    /// Fade engine
    pub fn transitions(&self) -> &TransitionEngine<N> {
        &self.transitions
    }

    /// Button mask seen on the last main-loop step
    pub fn buttons(&self) -> u8 {
        self.buttons
    }
}

/// [`Lightpainter`] shared between the tick interrupt and the main loop
///
/// # Usage
///
/// ```ignore
/// static PAINTER: SharedLightpainter<Led, 4> = SharedLightpainter::new();
///
/// PAINTER.install(Lightpainter::new(led, &LightpainterConfig::REFERENCE));
/// loop {
///     let mask = buttons.read_mask().unwrap_or(0);
///     let _ = PAINTER.service(mask, &mut bus);
/// }
///
/// // PWM timer overflow interrupt
/// PAINTER.on_pwm_overflow();
/// ```
pub struct SharedLightpainter<L: LedOutput, const N: usize> {
    inner: Mutex<RefCell<Option<Lightpainter<L, N>>>>,
}

impl<L: LedOutput, const N: usize> SharedLightpainter<L, N> {
    /// Create an empty slot, usable in a `static`
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install the state, returning any previously installed one
    pub fn install(&self, painter: Lightpainter<L, N>) -> Option<Lightpainter<L, N>> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().replace(painter))
    }

    /// Run `f` on the state with the interrupt excluded
    ///
    /// Returns `None` if nothing is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Lightpainter<L, N>) -> R) -> Option<R> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// Interrupt context: one PWM timer overflow
    pub fn on_pwm_overflow(&self) -> bool {
        self.with(Lightpainter::on_pwm_overflow).unwrap_or(false)
    }

    /// Main loop context: apply the button mask, poll the touchpad once and
    /// handle the resulting sample
    ///
    /// Returns the gesture step produced, or `None` if the touchpad had
    /// nothing to report.
    pub fn service<P, C>(
        &self,
        buttons: u8,
        bus: &mut AdbBus<P, C>,
    ) -> Result<Option<DragGesture>, ServiceError<P::Error>>
    where
        P: InputPin + OutputPin,
        C: TickCounter,
    {
        self.with(|painter| painter.update_buttons(buttons))
            .ok_or(ServiceError::Uninitialized)?;

        let mut report = [0u8; MAX_RESPONSE];
        let received = match bus.poll(&mut report) {
            Ok(received) => received,
            Err(err) => {
                #[cfg(feature = "esp32-log")]
                println!("[SharedLightpainter.service] error polling adb: {:?}", err);
                return Err(ServiceError::Bus(err));
            }
        };
        if received == 0 {
            return Ok(None);
        }

        let Some(sample) = PointerSample::decode(&report[..received]) else {
            #[cfg(feature = "esp32-log")]
            println!("[SharedLightpainter.service] short report: {} bytes", received);
            return Err(ServiceError::ShortReport(received));
        };

        self.with(|painter| painter.handle_sample(sample))
            .ok_or(ServiceError::Uninitialized)
    }
}

impl<L: LedOutput, const N: usize> Default for SharedLightpainter<L, N> {
    fn default() -> Self {
        Self::new()
    }
}
