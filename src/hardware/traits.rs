use crate::offset::Buttons;

pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Produces one button snapshot per tick
pub trait InputSource {
    fn sample(&mut self) -> Buttons;
}
