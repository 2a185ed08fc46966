/// Aggregates that can be combined after being collected independently.
///
/// Implementations must form a commutative monoid with `Default` as the identity:
/// merging in any grouping or order yields the same aggregate. Worker results are
/// merged in completion order, which is not deterministic.
pub trait Merge: Default {
    fn merge(&mut self, other: &Self);

    /// Folds any number of aggregates into one.
    fn merged<'a, I>(items: I) -> Self
    where
        Self: 'a,
        I: IntoIterator<Item = &'a Self>,
    {
        let mut acc = Self::default();
        for item in items {
            acc.merge(item);
        }
        acc
    }
}
