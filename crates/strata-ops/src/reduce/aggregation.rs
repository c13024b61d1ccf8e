use std::fmt;
use strata_columnar::ColumnType;

/// Reduction to a single scalar over a column's valid values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregation {
    /// Every valid value is non-zero / true.
    All,
    /// At least one valid value is non-zero / true.
    Any,
    Min,
    Max,
    Sum,
    Product,
    SumOfSquares,
    Mean,
    /// Variance with `ddof` delta degrees of freedom (`1` = sample variance).
    Variance { ddof: u32 },
    /// Standard deviation with `ddof` delta degrees of freedom.
    Std { ddof: u32 },
    /// Sample skewness (adjusted Fisher-Pearson). Null below 3 values, 0 for constant input.
    Skew,
    /// Sample excess kurtosis. Null below 4 values, 0 for constant input.
    Kurtosis,
}

impl Aggregation {
    /// Result type for an input column type, or `None` if the pair is unsupported.
    ///
    /// | aggregation | inputs | output |
    /// |---|---|---|
    /// | `All`, `Any` | bool, integers, floats | bool |
    /// | `Min`, `Max` | every type | input type |
    /// | `Sum`, `Product`, `SumOfSquares` | integers / floats | int64 / float64 |
    /// | `Mean`, `Variance`, `Std`, `Skew`, `Kurtosis` | bool, integers, floats | float64 |
    pub fn output_type(self, input: ColumnType) -> Option<ColumnType> {
        match self {
            Aggregation::All | Aggregation::Any => {
                (input.is_boolean() || input.is_numeric()).then_some(ColumnType::Bool8)
            }
            Aggregation::Min | Aggregation::Max => Some(input),
            Aggregation::Sum | Aggregation::Product | Aggregation::SumOfSquares => {
                if input.is_integer() {
                    Some(ColumnType::Int64)
                } else if input.is_floating() {
                    Some(ColumnType::Float64)
                } else {
                    None
                }
            }
            Aggregation::Mean
            | Aggregation::Variance { .. }
            | Aggregation::Std { .. }
            | Aggregation::Skew
            | Aggregation::Kurtosis => {
                (input.is_boolean() || input.is_numeric()).then_some(ColumnType::Float64)
            }
        }
    }

    /// Aggregations whose result only depends on the *set* of valid values, not on how
    /// often each occurs. These can be computed over a dictionary's referenced keys.
    pub fn is_idempotent(self) -> bool {
        matches!(
            self,
            Aggregation::All | Aggregation::Any | Aggregation::Min | Aggregation::Max
        )
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::All => f.write_str("all"),
            Aggregation::Any => f.write_str("any"),
            Aggregation::Min => f.write_str("min"),
            Aggregation::Max => f.write_str("max"),
            Aggregation::Sum => f.write_str("sum"),
            Aggregation::Product => f.write_str("product"),
            Aggregation::SumOfSquares => f.write_str("sum_of_squares"),
            Aggregation::Mean => f.write_str("mean"),
            Aggregation::Variance { ddof } => write!(f, "var(ddof={ddof})"),
            Aggregation::Std { ddof } => write!(f, "std(ddof={ddof})"),
            Aggregation::Skew => f.write_str("skew"),
            Aggregation::Kurtosis => f.write_str("kurtosis"),
        }
    }
}
