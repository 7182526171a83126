//! Serial command line parser
//!
//! The serial host sends each command byte as a decimal number followed by a newline, e.g.
//! `"39\n"`. Carriage returns are ignored. A line holding anything other than digits, or a
//! number above 255, is dropped as a whole.

enum State {
    /// Collecting digits of the current line
    Reading { value: u16, digits: u8 },
    /// Dropping the rest of a bad line
    Discarding,
}

pub struct LineParser {
    state: State,
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            state: State::Reading {
                value: 0,
                digits: 0,
            },
        }
    }

    /// Process one received byte. Returns the value once a complete line is received.
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        match (&mut self.state, byte) {
            (_, b'\r') => None,
            (State::Discarding, b'\n') => {
                self.reset();
                None
            }
            (State::Discarding, _) => None,
            (State::Reading { value, digits }, b'\n') => {
                let line = (*digits > 0).then_some(*value as u8);
                self.reset();
                line
            }
            (State::Reading { value, digits }, b'0'..=b'9') => {
                *value = *value * 10 + u16::from(byte - b'0');
                *digits = digits.saturating_add(1);
                if *value > u16::from(u8::MAX) {
                    self.state = State::Discarding;
                }
                None
            }
            (State::Reading { .. }, _) => {
                self.state = State::Discarding;
                None
            }
        }
    }

    fn reset(&mut self) {
        self.state = State::Reading {
            value: 0,
            digits: 0,
        };
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}
