/// Engine time in seconds, accumulated from measured frame deltas.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Self = Self(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn advanced_by(self, dt_s: f64) -> Self {
        Self(self.0 + dt_s.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::Time;

    #[test]
    fn advancing_ignores_negative_deltas() {
        let t = Time(1.5);
        assert_eq!(t.advanced_by(0.5), Time(2.0));
        assert_eq!(t.advanced_by(-3.0), t);
    }
}
