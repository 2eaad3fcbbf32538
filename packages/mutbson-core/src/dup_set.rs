use std::collections::BTreeSet;

/// "Seen before?" set tuned for the common case of few members.
///
/// Lookups scan a vector until the set has served more than `upgrade_threshold`
/// accesses, then the members move into a `BTreeSet` for the rest of its life.
#[derive(Clone, Debug)]
pub struct SmallDupSet<T: Ord> {
    vec: Vec<T>,
    set: BTreeSet<T>,
    upgraded: bool,
    accesses: u64,
    upgrade_threshold: u64,
}

impl<T: Ord> SmallDupSet<T> {
    pub const DEFAULT_UPGRADE_THRESHOLD: u64 = 500;
    const INITIAL_CAPACITY: usize = 250;

    pub fn new() -> Self {
        Self::with_upgrade_threshold(Self::DEFAULT_UPGRADE_THRESHOLD)
    }

    pub fn with_upgrade_threshold(upgrade_threshold: u64) -> Self {
        let capacity = Self::INITIAL_CAPACITY.min(upgrade_threshold as usize);
        Self {
            vec: Vec::with_capacity(capacity),
            set: BTreeSet::new(),
            upgraded: false,
            accesses: 0,
            upgrade_threshold,
        }
    }

    /// Inserts `item`; returns whether it was already present.
    pub fn get_set_dup(&mut self, item: T) -> bool {
        self.touch();
        if self.upgraded {
            return !self.set.insert(item);
        }
        if self.vec.contains(&item) {
            return true;
        }
        self.vec.push(item);
        false
    }

    /// Membership test without inserting.
    pub fn get_dup(&mut self, item: &T) -> bool {
        self.touch();
        if self.upgraded {
            self.set.contains(item)
        } else {
            self.vec.contains(item)
        }
    }

    pub fn len(&self) -> usize {
        if self.upgraded {
            self.set.len()
        } else {
            self.vec.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_upgraded(&self) -> bool {
        self.upgraded
    }

    fn touch(&mut self) {
        self.accesses += 1;
        if !self.upgraded && self.accesses > self.upgrade_threshold {
            self.set.extend(self.vec.drain(..));
            self.vec = Vec::new();
            self.upgraded = true;
        }
    }
}

impl<T: Ord> Default for SmallDupSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_duplicates() {
        let mut set = SmallDupSet::new();
        assert!(!set.get_set_dup(3u32));
        assert!(set.get_set_dup(3));
        assert!(set.get_dup(&3));
        assert!(!set.get_dup(&4));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn upgrades_after_threshold_and_keeps_members() {
        let mut set = SmallDupSet::with_upgrade_threshold(4);
        for i in 0..4u32 {
            assert!(!set.get_set_dup(i));
        }
        assert!(!set.is_upgraded());
        assert!(set.get_dup(&2));
        assert!(set.is_upgraded());
        for i in 0..4u32 {
            assert!(set.get_set_dup(i));
        }
        assert!(!set.get_set_dup(10));
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn upgrade_of_empty_set_still_switches_mode() {
        let mut set: SmallDupSet<u32> = SmallDupSet::with_upgrade_threshold(0);
        assert!(!set.get_dup(&1));
        assert!(set.is_upgraded());
        assert!(set.is_empty());
    }
}
