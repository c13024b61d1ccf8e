use std::cmp::Ordering;
use strata_columnar::{ColumnType, Primitive, Scalar};

/// Mergeable fold state for one aggregation.
///
/// `merge` must be associative so chunks folded on different threads combine to the
/// same result as one sequential pass (up to float rounding for the sums).
pub(crate) trait Accumulator<T: Primitive>: Clone + Send + Sync {
    fn update(&mut self, value: T);

    fn merge(&mut self, other: Self);

    /// Final scalar; null when no value was ever folded in.
    fn finish(self, output: ColumnType) -> Scalar;
}

#[derive(Clone, Debug)]
pub(crate) struct AllAcc {
    seen: bool,
    all: bool,
}

impl Default for AllAcc {
    fn default() -> Self {
        Self {
            seen: false,
            all: true,
        }
    }
}

impl<T: Primitive> Accumulator<T> for AllAcc {
    #[inline]
    fn update(&mut self, value: T) {
        self.seen = true;
        self.all &= value.is_truthy();
    }

    fn merge(&mut self, other: Self) {
        self.seen |= other.seen;
        self.all &= other.all;
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        Scalar::Bool8(self.seen.then_some(self.all))
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct AnyAcc {
    seen: bool,
    any: bool,
}

impl<T: Primitive> Accumulator<T> for AnyAcc {
    #[inline]
    fn update(&mut self, value: T) {
        self.seen = true;
        self.any |= value.is_truthy();
    }

    fn merge(&mut self, other: Self) {
        self.seen |= other.seen;
        self.any |= other.any;
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        Scalar::Bool8(self.seen.then_some(self.any))
    }
}

/// Running extremum. `keep` is the ordering a new value must have against the current
/// one to replace it (`Less` for MIN, `Greater` for MAX).
#[derive(Clone, Debug)]
pub(crate) struct ExtremumAcc<T> {
    best: Option<T>,
    keep: Ordering,
}

impl<T> ExtremumAcc<T> {
    pub(crate) fn min() -> Self {
        Self {
            best: None,
            keep: Ordering::Less,
        }
    }

    pub(crate) fn max() -> Self {
        Self {
            best: None,
            keep: Ordering::Greater,
        }
    }
}

impl<T: Primitive> Accumulator<T> for ExtremumAcc<T> {
    #[inline]
    fn update(&mut self, value: T) {
        match self.best {
            Some(best) if value.total_cmp(&best) != self.keep => {}
            _ => self.best = Some(value),
        }
    }

    fn merge(&mut self, other: Self) {
        if let Some(value) = other.best {
            Accumulator::<T>::update(self, value);
        }
    }

    fn finish(self, output: ColumnType) -> Scalar {
        T::into_scalar(self.best, output)
    }
}

/// Integer SUM / PRODUCT / SUM_OF_SQUARES into `i64` with two's-complement wrapping.
#[derive(Clone, Debug)]
pub(crate) struct IntFoldAcc {
    op: ArithmeticOp,
    acc: i64,
    seen: bool,
}

/// Floating point SUM / PRODUCT / SUM_OF_SQUARES into `f64`.
#[derive(Clone, Debug)]
pub(crate) struct FloatFoldAcc {
    op: ArithmeticOp,
    acc: f64,
    seen: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArithmeticOp {
    Sum,
    Product,
    SumOfSquares,
}

impl IntFoldAcc {
    pub(crate) fn new(op: ArithmeticOp) -> Self {
        let acc = if op == ArithmeticOp::Product { 1 } else { 0 };
        Self {
            op,
            acc,
            seen: false,
        }
    }
}

impl FloatFoldAcc {
    pub(crate) fn new(op: ArithmeticOp) -> Self {
        let acc = if op == ArithmeticOp::Product { 1.0 } else { 0.0 };
        Self {
            op,
            acc,
            seen: false,
        }
    }
}

impl<T: Primitive> Accumulator<T> for IntFoldAcc {
    #[inline]
    fn update(&mut self, value: T) {
        let v = value.to_i64().unwrap_or_default();
        self.seen = true;
        self.acc = match self.op {
            ArithmeticOp::Sum => self.acc.wrapping_add(v),
            ArithmeticOp::Product => self.acc.wrapping_mul(v),
            ArithmeticOp::SumOfSquares => self.acc.wrapping_add(v.wrapping_mul(v)),
        };
    }

    fn merge(&mut self, other: Self) {
        self.seen |= other.seen;
        self.acc = match self.op {
            ArithmeticOp::Product => self.acc.wrapping_mul(other.acc),
            ArithmeticOp::Sum | ArithmeticOp::SumOfSquares => self.acc.wrapping_add(other.acc),
        };
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        Scalar::Int64(self.seen.then_some(self.acc))
    }
}

impl<T: Primitive> Accumulator<T> for FloatFoldAcc {
    #[inline]
    fn update(&mut self, value: T) {
        let v = value.to_f64();
        self.seen = true;
        match self.op {
            ArithmeticOp::Sum => self.acc += v,
            ArithmeticOp::Product => self.acc *= v,
            ArithmeticOp::SumOfSquares => self.acc += v * v,
        }
    }

    fn merge(&mut self, other: Self) {
        self.seen |= other.seen;
        match self.op {
            ArithmeticOp::Product => self.acc *= other.acc,
            ArithmeticOp::Sum | ArithmeticOp::SumOfSquares => self.acc += other.acc,
        }
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        Scalar::Float64(self.seen.then_some(self.acc))
    }
}

/// MEAN as a (sum, count) pair widened to `f64`.
#[derive(Clone, Debug, Default)]
pub(crate) struct MeanAcc {
    sum: f64,
    count: u64,
}

impl<T: Primitive> Accumulator<T> for MeanAcc {
    #[inline]
    fn update(&mut self, value: T) {
        self.sum += value.to_f64();
        self.count += 1;
    }

    fn merge(&mut self, other: Self) {
        self.sum += other.sum;
        self.count += other.count;
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        if self.count == 0 {
            return Scalar::Float64(None);
        }
        Scalar::Float64(Some(self.sum / self.count as f64))
    }
}

/// Statistic finished from the central moments of a [`MomentsAcc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Moment {
    Variance { ddof: u32 },
    Std { ddof: u32 },
    Skew,
    Kurtosis,
}

/// VAR / STD / SKEW / KURTOSIS from (count, mean, M2, M3, M4), where `Mk` is the sum of
/// k-th powers of deviations from the mean.
///
/// Updates are the one-pass Welford/Terriberry recurrences; `merge` is the pairwise
/// combination of Chan et al. extended to the third and fourth moments (Pébay 2008).
#[derive(Clone, Debug)]
pub(crate) struct MomentsAcc {
    stat: Moment,
    count: u64,
    mean: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl MomentsAcc {
    pub(crate) fn new(stat: Moment) -> Self {
        Self {
            stat,
            count: 0,
            mean: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    fn higher_moments(&self) -> bool {
        matches!(self.stat, Moment::Skew | Moment::Kurtosis)
    }

    fn finish_value(&self) -> Option<f64> {
        let n = self.count as f64;
        match self.stat {
            Moment::Variance { ddof } | Moment::Std { ddof } => {
                if self.count <= u64::from(ddof) {
                    return None;
                }
                let variance = self.m2 / (self.count - u64::from(ddof)) as f64;
                Some(if matches!(self.stat, Moment::Std { .. }) {
                    variance.sqrt()
                } else {
                    variance
                })
            }
            // Adjusted Fisher-Pearson coefficient over the population variance.
            Moment::Skew => {
                if self.count < 3 {
                    return None;
                }
                let m2 = self.m2 / n;
                if m2 == 0.0 {
                    return Some(0.0);
                }
                let m3 = self.m3 / n;
                Some((n * (n - 1.0)).sqrt() / (n - 2.0) * m3 / m2.powf(1.5))
            }
            // Unbiased excess kurtosis over the sample variance.
            Moment::Kurtosis => {
                if self.count < 4 {
                    return None;
                }
                let variance = self.m2 / (n - 1.0);
                if variance == 0.0 {
                    return Some(0.0);
                }
                let scale = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
                let bias = 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
                Some(scale * self.m4 / (variance * variance) - bias)
            }
        }
    }
}

impl<T: Primitive> Accumulator<T> for MomentsAcc {
    #[inline]
    fn update(&mut self, value: T) {
        let x = value.to_f64();
        let n1 = self.count as f64;
        self.count += 1;
        let n = self.count as f64;
        let delta = x - self.mean;
        let delta_n = delta / n;
        let term = delta * delta_n * n1;
        self.mean += delta_n;
        if self.higher_moments() {
            let delta_n2 = delta_n * delta_n;
            self.m4 += term * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
                - 4.0 * delta_n * self.m3;
            self.m3 += term * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        }
        self.m2 += term;
    }

    fn merge(&mut self, other: Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = Self {
                stat: self.stat,
                ..other
            };
            return;
        }

        let (na, nb) = (self.count as f64, other.count as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;
        let d2 = delta * delta;
        if self.higher_moments() {
            let m4 = self.m4
                + other.m4
                + d2 * d2 * na * nb * (na * na - na * nb + nb * nb) / (n * n * n)
                + 6.0 * d2 * (na * na * other.m2 + nb * nb * self.m2) / (n * n)
                + 4.0 * delta * (na * other.m3 - nb * self.m3) / n;
            let m3 = self.m3
                + other.m3
                + d2 * delta * na * nb * (na - nb) / (n * n)
                + 3.0 * delta * (na * other.m2 - nb * self.m2) / n;
            self.m4 = m4;
            self.m3 = m3;
        }
        self.m2 += other.m2 + d2 * na * nb / n;
        self.mean += delta * nb / n;
        self.count += other.count;
    }

    fn finish(self, _output: ColumnType) -> Scalar {
        Scalar::Float64(self.finish_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold<T: Primitive, A: Accumulator<T>>(mut acc: A, values: &[T]) -> A {
        for &v in values {
            acc.update(v);
        }
        acc
    }

    #[test]
    fn moments_merge_matches_single_pass() {
        let values = [2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let whole = fold(MomentsAcc::new(Moment::Variance { ddof: 0 }), &values);

        let mut left = fold(MomentsAcc::new(Moment::Variance { ddof: 0 }), &values[..3]);
        let right = fold(MomentsAcc::new(Moment::Variance { ddof: 0 }), &values[3..]);
        Accumulator::<f64>::merge(&mut left, right);

        let a = Accumulator::<f64>::finish(whole, ColumnType::Float64).as_f64().unwrap();
        let b = Accumulator::<f64>::finish(left, ColumnType::Float64).as_f64().unwrap();
        assert!((a - 4.0).abs() < 1e-12);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn extremum_merge_keeps_best() {
        let mut lo = fold(ExtremumAcc::min(), &[5i32, 3, 8]);
        let other = fold(ExtremumAcc::min(), &[4i32, 1]);
        Accumulator::<i32>::merge(&mut lo, other);
        assert_eq!(
            Accumulator::<i32>::finish(lo, ColumnType::Int32),
            Scalar::Int32(Some(1))
        );
    }

    #[test]
    fn integer_sum_wraps() {
        let acc = fold(IntFoldAcc::new(ArithmeticOp::Sum), &[i64::MAX, 1]);
        assert_eq!(
            Accumulator::<i64>::finish(acc, ColumnType::Int64),
            Scalar::Int64(Some(i64::MIN))
        );
    }

    /// Two-pass (skew, kurtosis) with the same bias corrections.
    fn shape_reference(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let central = |k: i32| values.iter().map(|v| (v - mean).powi(k)).sum::<f64>();
        let (m2, m3, m4) = (central(2), central(3), central(4));
        let skew = (n * (n - 1.0)).sqrt() / (n - 2.0) * (m3 / n) / (m2 / n).powf(1.5);
        let var = m2 / (n - 1.0);
        let kurt = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * m4 / (var * var)
            - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0));
        (skew, kurt)
    }

    fn finish_f64(acc: MomentsAcc) -> Option<f64> {
        Accumulator::<f64>::finish(acc, ColumnType::Float64).as_f64()
    }

    #[test]
    fn shape_moments_match_two_pass_reference() {
        let values = [1.0f64, 2.0, 2.5, 4.0, 7.0, 7.5, 11.0, 30.0, -3.0];
        let (skew, kurt) = shape_reference(&values);
        let got_skew = finish_f64(fold(MomentsAcc::new(Moment::Skew), &values)).unwrap();
        let got_kurt = finish_f64(fold(MomentsAcc::new(Moment::Kurtosis), &values)).unwrap();
        assert!((got_skew - skew).abs() < 1e-9, "{got_skew} vs {skew}");
        assert!((got_kurt - kurt).abs() < 1e-9, "{got_kurt} vs {kurt}");
    }

    #[test]
    fn shape_moments_merge_matches_single_pass() {
        let values = [1.0f64, 2.0, 2.5, 4.0, 7.0, 7.5, 11.0, 30.0, -3.0];
        for stat in [Moment::Skew, Moment::Kurtosis] {
            let whole = finish_f64(fold(MomentsAcc::new(stat), &values)).unwrap();
            for split in 0..=values.len() {
                let mut left = fold(MomentsAcc::new(stat), &values[..split]);
                let right = fold(MomentsAcc::new(stat), &values[split..]);
                Accumulator::<f64>::merge(&mut left, right);
                let merged = finish_f64(left).unwrap();
                assert!((whole - merged).abs() < 1e-9, "{stat:?} split {split}");
            }
        }
    }

    #[test]
    fn shape_moments_small_and_constant_inputs() {
        assert_eq!(finish_f64(fold(MomentsAcc::new(Moment::Skew), &[1.0, 2.0])), None);
        assert_eq!(
            finish_f64(fold(MomentsAcc::new(Moment::Kurtosis), &[1.0, 2.0, 3.0])),
            None
        );
        let constant = [4.0f64; 6];
        assert_eq!(finish_f64(fold(MomentsAcc::new(Moment::Skew), &constant)), Some(0.0));
        assert_eq!(
            finish_f64(fold(MomentsAcc::new(Moment::Kurtosis), &constant)),
            Some(0.0)
        );
    }

    #[test]
    fn ddof_larger_than_count_is_null() {
        let acc = fold(MomentsAcc::new(Moment::Std { ddof: 1 }), &[3.0f32]);
        assert_eq!(
            Accumulator::<f32>::finish(acc, ColumnType::Float64),
            Scalar::Float64(None)
        );
    }
}
