/// The narrow capability set shared by every index in this crate.
///
/// Callers that only need to count, snapshot, reset or print an index can hold any of the
/// variants behind this trait.
pub trait Container<T> {
    /// Returns true if the index holds no values
    fn is_empty(&self) -> bool;

    /// The number of values held
    fn len(&self) -> usize;

    /// A snapshot of every value, in no particular order
    fn values(&self) -> Vec<T>;

    /// Drops every value and every key mapping
    fn clear(&mut self);

    /// A debug rendering of the index, prefixed with the type's name
    fn render(&self) -> String;
}
