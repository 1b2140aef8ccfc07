/// A value derived from a metrics export, or why it could not be derived.
///
/// Absent and insufficient readings are soft failures: callers report them
/// and carry on with the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading<T> {
    Value(T),
    /// The export has no line for the metric.
    Absent,
    /// No bucket reached the median target.
    Insufficient { target: u64 },
}

impl<T> Reading<T> {
    #[must_use]
    pub fn value(self) -> Option<T> {
        match self {
            Reading::Value(value) => Some(value),
            Reading::Absent | Reading::Insufficient { .. } => None,
        }
    }
}

impl<T: Default> Reading<T> {
    /// The value, or zero for absent and insufficient readings.
    #[must_use]
    pub fn or_zero(self) -> T {
        self.value().unwrap_or_default()
    }
}
