//! Document construction parameters.

/// Sizing hints and traversal limits for a [`crate::Document`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Element slots reserved up front. Default: 64.
    pub element_capacity: usize,

    /// Heap bytes reserved up front. Default: 1024.
    pub heap_capacity: usize,

    /// Maximum number of parent hops a subtree iterator takes in one step
    /// while looking for the next sibling.
    ///
    /// Default: 50. Nodes nested deeper than this below the iteration origin are
    /// reached, but traversal ends after them.
    pub depth_limit: u32,

    /// Deepest nesting below an exported element that `to_value` accepts, and the deepest
    /// value that `make_element` imports. Default: 200.
    ///
    /// Deeper trees can still be built one element at a time, but exporting them fails
    /// with `BadValue`.
    pub max_nesting: usize,
}

impl DocumentOptions {
    pub const DEFAULT_ELEMENT_CAPACITY: usize = 64;
    pub const DEFAULT_HEAP_CAPACITY: usize = 1024;
    pub const DEFAULT_DEPTH_LIMIT: u32 = 50;
    pub const DEFAULT_MAX_NESTING: usize = 200;

    pub fn new() -> Self {
        Self {
            element_capacity: Self::DEFAULT_ELEMENT_CAPACITY,
            heap_capacity: Self::DEFAULT_HEAP_CAPACITY,
            depth_limit: Self::DEFAULT_DEPTH_LIMIT,
            max_nesting: Self::DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_depth_limit(mut self, depth_limit: u32) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DocumentOptions::default();
        assert_eq!(options.depth_limit, 50);
        assert_eq!(options.element_capacity, 64);
        assert_eq!(options.max_nesting, 200);
    }

    #[test]
    fn depth_limit_override() {
        assert_eq!(DocumentOptions::new().with_depth_limit(3).depth_limit, 3);
    }
}
