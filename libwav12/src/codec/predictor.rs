// Second order extrapolation over the last three samples

/// prediction state, the three most recent post-shift samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub prev1: i16,
    pub prev2: i16,
    pub prev3: i16,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// 3*prev1 - 3*prev2 + prev3, in 32-bit arithmetic
    #[inline]
    pub fn predict(&self) -> i32 {
        let (p1, p2, p3) = (self.prev1 as i32, self.prev2 as i32, self.prev3 as i32);
        3 * p1 - 3 * p2 + p3
    }

    #[inline]
    pub fn advance(&mut self, sample: i16) {
        self.prev3 = self.prev2;
        self.prev2 = self.prev1;
        self.prev1 = sample;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_extends_quadratic() {
        let mut ctx = Context::new();
        assert_eq!(ctx.predict(), 0);
        // n^2 for n = 1, 2, 3 predicts 16
        for s in [1, 4, 9] {
            ctx.advance(s);
        }
        assert_eq!(ctx.predict(), 16);
    }

    #[test]
    fn test_predict_does_not_overflow() {
        let ctx = Context {
            prev1: i16::MAX,
            prev2: i16::MIN,
            prev3: i16::MAX,
        };
        assert_eq!(ctx.predict(), 3 * 32767 + 3 * 32768 + 32767);
    }
}
