/// Direction of one sort key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Where nulls sort relative to non-null values, before any descending flip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NullOrder {
    /// Nulls compare less than every value.
    #[default]
    Before,
    /// Nulls compare greater than every value.
    After,
}

/// Whether two nulls at the same position are the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NullEquality {
    #[default]
    Equal,
    Unequal,
}

/// Whether two NaNs at the same position are the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NanEquality {
    #[default]
    AllEqual,
    Unequal,
}

/// Which member of a group of equal rows survives distinct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeepPolicy {
    /// One unspecified member.
    #[default]
    Any,
    /// The member with the smallest row index.
    First,
    /// The member with the largest row index.
    Last,
    /// No member, unless the group has exactly one.
    None,
}

/// Depth of the struct level at which a null decided a comparison.
///
/// `None` means no null was involved.
pub type NullDepth = Option<u32>;
