use embedded_hal::digital::InputPin;

use super::traits::{Button, InputSource};
use crate::offset::Buttons;

/// Active-low push button on a pulled-up input
///
/// A pin read error counts as "not pressed".
pub struct GpioButton<P> {
    pin: P,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> Button for GpioButton<P> {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}

/// The four orrery buttons sampled together
pub struct ButtonPanel<A, R, M, Q> {
    pub advance: A,
    pub retard: R,
    pub mode: M,
    pub quit: Q,
}

impl<A, R, M, Q> ButtonPanel<A, R, M, Q>
where
    A: Button,
    R: Button,
    M: Button,
    Q: Button,
{
    pub fn new(advance: A, retard: R, mode: M, quit: Q) -> Self {
        Self {
            advance,
            retard,
            mode,
            quit,
        }
    }
}

impl<A, R, M, Q> InputSource for ButtonPanel<A, R, M, Q>
where
    A: Button,
    R: Button,
    M: Button,
    Q: Button,
{
    fn sample(&mut self) -> Buttons {
        Buttons {
            advance: self.advance.is_pressed(),
            retard: self.retard.is_pressed(),
            mode: self.mode.is_pressed(),
            quit: self.quit.is_pressed(),
        }
    }
}
