use crate::util::{now_ms, random_u64};

/// Prefix reserved for client-side ids that the backend has never seen.
pub(crate) const TMP_ID_PREFIX: &str = "tmp-";

pub(crate) fn is_tmp_id(id: &str) -> bool {
    id.starts_with(TMP_ID_PREFIX)
}

pub(crate) fn make_tmp_id(now_ms: i64, rand: u64) -> String {
    format!("{TMP_ID_PREFIX}{now_ms}-{rand}")
}

/// Source of temporary ids for locally created nodes.
pub(crate) trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Browser id source: wall clock plus a random suffix.
///
/// Reads `Date.now()`, so it only works under wasm.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TmpIdGenerator;

impl IdGenerator for TmpIdGenerator {
    fn next_id(&mut self) -> String {
        make_tmp_id(now_ms(), random_u64())
    }
}

/// Deterministic ids (`tmp-1`, `tmp-2`, ...).
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct SequentialIds {
    next: u64,
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{TMP_ID_PREFIX}{}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_ids_are_recognised() {
        assert!(is_tmp_id(&make_tmp_id(1700000000000, 42)));
        assert_eq!(make_tmp_id(5, 7), "tmp-5-7");
        assert!(!is_tmp_id("42"));
        assert!(!is_tmp_id("chapter-tmp-1"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id(), "tmp-1");
        assert_eq!(ids.next_id(), "tmp-2");
        assert!(is_tmp_id(&ids.next_id()));
    }
}
