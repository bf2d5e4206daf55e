use std::cmp::Ordering;
use std::ffi::OsString;

/// One ranked result: a path for files and folders, a package name for packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizedEntry {
    pub identifier: OsString,
    pub size_bytes: u64,
}

impl SizedEntry {
    pub fn new(identifier: impl Into<OsString>, size_bytes: u64) -> Self {
        Self {
            identifier: identifier.into(),
            size_bytes,
        }
    }

    /// Biggest first; equal sizes fall back to identifier order so output is reproducible.
    fn rank(&self, other: &SizedEntry) -> Ordering {
        other
            .size_bytes
            .cmp(&self.size_bytes)
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

/// Bounded list holding the `max_count` biggest entries seen so far, sorted descending.
#[derive(Debug, Clone)]
pub struct RankedList {
    entries: Vec<SizedEntry>,
    max_count: usize,
}

impl RankedList {
    pub fn new(max_count: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_count.min(1024)),
            max_count,
        }
    }

    /// Offers `entry` to the list. Returns whether it was kept.
    ///
    /// Below capacity every entry is kept. At capacity the entry must be strictly
    /// bigger than the current smallest one, which is then evicted.
    pub fn try_insert(&mut self, entry: SizedEntry) -> bool {
        if self.max_count == 0 {
            return false;
        }

        if self.entries.len() >= self.max_count {
            match self.entries.last() {
                Some(smallest) if entry.size_bytes > smallest.size_bytes => {
                    self.entries.pop();
                }
                _ => return false,
            }
        }

        let at = self
            .entries
            .partition_point(|e| e.rank(&entry) != Ordering::Greater);
        self.entries.insert(at, entry);
        true
    }

    pub fn entries(&self) -> &[SizedEntry] {
        &self.entries
    }

    pub fn smallest(&self) -> Option<&SizedEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_count
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(list: &RankedList) -> Vec<u64> {
        list.entries().iter().map(|e| e.size_bytes).collect()
    }

    fn assert_sorted(list: &RankedList) {
        assert!(list
            .entries()
            .windows(2)
            .all(|w| w[0].size_bytes >= w[1].size_bytes));
    }

    #[test]
    fn test_fills_up_to_capacity_sorted() {
        let mut list = RankedList::new(3);
        assert!(list.try_insert(SizedEntry::new("a", 10)));
        assert!(list.try_insert(SizedEntry::new("b", 30)));
        assert!(list.try_insert(SizedEntry::new("c", 20)));
        assert_eq!(sizes(&list), vec![30, 20, 10]);
        assert!(list.is_full());
    }

    #[test]
    fn test_length_never_exceeds_max_count() {
        let mut list = RankedList::new(5);
        for i in 0..200u64 {
            // Scrambled sizes with plenty of duplicates
            list.try_insert(SizedEntry::new(format!("f{}", i), (i * 37) % 23));
            assert!(list.len() <= 5);
            assert_sorted(&list);
        }
        assert_eq!(sizes(&list), vec![22, 22, 22, 22, 22]);
    }

    #[test]
    fn test_not_larger_than_minimum_is_noop() {
        let mut list = RankedList::new(2);
        list.try_insert(SizedEntry::new("a", 100));
        list.try_insert(SizedEntry::new("b", 50));
        let before = list.entries().to_vec();

        assert!(!list.try_insert(SizedEntry::new("c", 50)));
        assert!(!list.try_insert(SizedEntry::new("d", 7)));
        assert_eq!(list.entries(), &before[..]);
    }

    #[test]
    fn test_larger_than_minimum_evicts_exactly_the_minimum() {
        let mut list = RankedList::new(3);
        list.try_insert(SizedEntry::new("a", 100));
        list.try_insert(SizedEntry::new("b", 50));
        list.try_insert(SizedEntry::new("c", 10));

        assert!(list.try_insert(SizedEntry::new("d", 60)));
        assert_eq!(list.len(), 3);
        let names: Vec<_> = list
            .entries()
            .iter()
            .map(|e| e.identifier.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "d", "b"]);
    }

    #[test]
    fn test_ties_ordered_by_identifier() {
        let mut list = RankedList::new(4);
        list.try_insert(SizedEntry::new("zeta", 5));
        list.try_insert(SizedEntry::new("alpha", 5));
        list.try_insert(SizedEntry::new("mid", 9));
        list.try_insert(SizedEntry::new("beta", 5));
        let names: Vec<_> = list
            .entries()
            .iter()
            .map(|e| e.identifier.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["mid", "alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut list = RankedList::new(0);
        assert!(!list.try_insert(SizedEntry::new("a", 1)));
        assert!(list.is_empty());
        assert!(list.smallest().is_none());
    }
}
