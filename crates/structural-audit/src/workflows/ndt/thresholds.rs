/// Comparison applied by one row of a threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// Strictly greater than the value.
    Above(f64),
    /// Greater than or equal to the value.
    AtLeast(f64),
    /// Less than or equal to the value.
    AtMost(f64),
}

impl Bound {
    pub fn matches(self, value: f64) -> bool {
        match self {
            Bound::Above(limit) => value > limit,
            Bound::AtLeast(limit) => value >= limit,
            Bound::AtMost(limit) => value <= limit,
        }
    }
}

/// Ordered first-match rules with a terminal fallback, so every input lands in exactly one
/// tier. Rows are listed in the order they must be checked.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable<T: 'static> {
    rules: &'static [(Bound, T)],
    fallback: T,
}

impl<T: Copy> ThresholdTable<T> {
    pub const fn new(rules: &'static [(Bound, T)], fallback: T) -> Self {
        Self { rules, fallback }
    }

    pub fn classify(&self, value: f64) -> T {
        self.rules
            .iter()
            .find(|(bound, _)| bound.matches(value))
            .map(|(_, tier)| *tier)
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRADES: ThresholdTable<char> = ThresholdTable::new(
        &[(Bound::AtMost(0.0), 'z'), (Bound::Above(10.0), 'a'), (Bound::AtLeast(5.0), 'b')],
        'c',
    );

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(GRADES.classify(-1.0), 'z');
        assert_eq!(GRADES.classify(0.0), 'z');
        assert_eq!(GRADES.classify(10.0), 'b');
        assert_eq!(GRADES.classify(10.5), 'a');
        assert_eq!(GRADES.classify(5.0), 'b');
    }

    #[test]
    fn unmatched_values_use_the_fallback() {
        assert_eq!(GRADES.classify(4.99), 'c');
        assert_eq!(GRADES.classify(f64::NAN), 'c');
    }
}
