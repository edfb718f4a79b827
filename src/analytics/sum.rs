/// Exact floating point accumulator.
///
/// Keeps the running total as a list of non-overlapping partials
/// (Shewchuk's algorithm) and rounds once on read, so `value()` is the
/// correctly rounded sum of everything added. The result does not depend on
/// the order values were added in.
#[derive(Debug, Clone, Default)]
pub struct ExactSum {
    partials: Vec<f64>,
}

impl ExactSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs must be finite.
    pub fn add(&mut self, value: f64) {
        let mut x = value;
        let mut kept = 0;
        for j in 0..self.partials.len() {
            let mut y = self.partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            let lo = y - (hi - x);
            if lo != 0.0 {
                self.partials[kept] = lo;
                kept += 1;
            }
            x = hi;
        }
        self.partials.truncate(kept);
        self.partials.push(x);
    }

    pub fn value(&self) -> f64 {
        let Some((&last, rest)) = self.partials.split_last() else {
            return 0.0;
        };

        let mut hi = last;
        let mut lo = 0.0;
        let mut n = rest.len();
        while n > 0 {
            let x = hi;
            n -= 1;
            let y = rest[n];
            hi = x + y;
            lo = y - (hi - x);
            if lo != 0.0 {
                break;
            }
        }

        // Round half to even across the remaining partials
        if n > 0 && ((lo < 0.0 && rest[n - 1] < 0.0) || (lo > 0.0 && rest[n - 1] > 0.0)) {
            let y = lo * 2.0;
            let x = hi + y;
            if y == x - hi {
                hi = x;
            }
        }
        hi
    }
}

impl FromIterator<f64> for ExactSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = ExactSum::new();
        for value in iter {
            sum.add(value);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(ExactSum::new().value(), 0.0);
    }

    #[test]
    fn test_correctly_rounded() {
        let sum: ExactSum = [0.1, 0.2, 0.3].into_iter().collect();
        assert_eq!(sum.value(), 0.6);

        let sum: ExactSum = [1e100, 1.0, -1e100].into_iter().collect();
        assert_eq!(sum.value(), 1.0);
    }

    #[test]
    fn test_order_does_not_matter() {
        let values = [0.1, 0.7, -0.3, 1e-3, 2.5, -0.45];
        let expected = values.iter().copied().collect::<ExactSum>().value();

        for shift in 1..values.len() {
            let mut rotated = values.to_vec();
            rotated.rotate_left(shift);
            assert_eq!(rotated.iter().copied().collect::<ExactSum>().value(), expected);
            rotated.reverse();
            assert_eq!(rotated.iter().copied().collect::<ExactSum>().value(), expected);
        }
    }
}
