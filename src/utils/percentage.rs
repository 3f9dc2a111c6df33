use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.floor())
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || value.is_nan() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Caps the value at 100%. Used for drawing bars that shouldn't overflow.
    pub fn capped(self) -> Percentage {
        Percentage(self.0.min(100.))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// How much of `limit_ms` has been used. A zero limit counts any usage as fully used.
pub fn usage_percentage(used_ms: u64, limit_ms: u64) -> Percentage {
    if limit_ms == 0 {
        return Percentage(if used_ms == 0 { 0. } else { 100. });
    }
    Percentage::new_opt(used_ms as f64 / limit_ms as f64 * 100.)
        .expect("Percentage should always be at least 0")
}
