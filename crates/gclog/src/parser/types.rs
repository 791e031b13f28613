//! Types — the table of known collection tags and their attributes.

use serde::Serialize;

use Generation::*;
use GcPattern::*;

/// Heap area a collection (or collection phase) works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Generation {
    Young,
    Tenured,
    Perm,
    /// Whole heap (full collections)
    All,
    /// Remark sub-phases and similar bookkeeping steps
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Concurrency {
    /// Stop-the-world work
    Serial,
    /// Runs alongside the application (CMS concurrent phases)
    Concurrent,
}

/// What follows the tag on the log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GcPattern {
    /// The tag alone is the complete event (`[CMS-concurrent-mark-start]`)
    Tag,
    /// `<elapsed>/<duration> secs`
    PausePair,
    /// Memory triple without a pause
    Memory,
    /// Memory triple followed by a pause
    MemoryPause,
    /// Pause only
    Pause,
}

impl GcPattern {
    pub fn has_pause(&self) -> bool {
        matches!(self, GcPattern::MemoryPause | GcPattern::Pause)
    }
}

/// A recognized bracketed tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EventType {
    pub name: &'static str,
    pub generation: Generation,
    pub concurrency: Concurrency,
    pub pattern: GcPattern,
}

impl EventType {
    const fn new(
        name: &'static str,
        generation: Generation,
        concurrency: Concurrency,
        pattern: GcPattern,
    ) -> Self {
        Self { name, generation, concurrency, pattern }
    }

    const fn serial(name: &'static str, generation: Generation, pattern: GcPattern) -> Self {
        Self::new(name, generation, Concurrency::Serial, pattern)
    }

    const fn concurrent(name: &'static str, pattern: GcPattern) -> Self {
        Self::new(name, Generation::Tenured, Concurrency::Concurrent, pattern)
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrency == Concurrency::Concurrent
    }

    /// Find the longest table entry that `text` starts with.
    ///
    /// Returns the type and the number of bytes of `text` it covers. A space
    /// in front of `(` in a table entry may be missing from `text`, so
    /// `ParNew(promotion failed)` resolves to `ParNew (promotion failed)`.
    pub fn match_prefix(text: &str) -> Option<(EventType, usize)> {
        let mut best: Option<(EventType, usize)> = None;
        for candidate in EVENT_TYPES {
            if let Some(len) = tag_match_len(text, candidate.name) {
                let longer = best.map_or(true, |(t, _)| candidate.name.len() > t.name.len());
                if longer {
                    best = Some((*candidate, len));
                }
            }
        }
        best
    }
}

fn tag_match_len(text: &str, name: &str) -> Option<usize> {
    let text = text.as_bytes();
    let name = name.as_bytes();
    let mut i = 0;
    let mut j = 0;
    while j < name.len() {
        if i < text.len() && text[i] == name[j] {
            i += 1;
            j += 1;
        } else if name[j] == b' ' && name.get(j + 1) == Some(&b'(') {
            j += 1;
        } else {
            return None;
        }
    }
    // "CMS" must not claim "CMS-concurrent-foo", nor "GC" claim "GCfoo"
    match text.get(i) {
        Some(c) if c.is_ascii_alphabetic() || *c == b'-' => None,
        _ => Some(i),
    }
}

pub const GC: EventType = EventType::serial("GC", Young, MemoryPause);
pub const FULL_GC: EventType = EventType::serial("Full GC", All, MemoryPause);
pub const PAR_NEW: EventType = EventType::serial("ParNew", Young, MemoryPause);
pub const DEF_NEW: EventType = EventType::serial("DefNew", Young, MemoryPause);
pub const YG_OCCUPANCY: EventType = EventType::serial("YG occupancy", Young, Memory);
pub const CMS_REMARK: EventType = EventType::serial("1 CMS-remark", Tenured, Memory);
pub const CMS_CONCURRENT_MARK_START: EventType =
    EventType::concurrent("CMS-concurrent-mark-start", Tag);
pub const CMS_CONCURRENT_MARK: EventType = EventType::concurrent("CMS-concurrent-mark", PausePair);

/// Every tag the Sun 1.4 - 1.7 collectors (except G1) print.
pub const EVENT_TYPES: &[EventType] = &[
    GC,
    EventType::serial("GC--", Young, MemoryPause),
    FULL_GC,
    EventType::serial("Full GC--", All, MemoryPause),
    EventType::serial("Full GC (System)", All, MemoryPause),
    // young collectors
    DEF_NEW,
    EventType::serial("DefNew (promotion failed)", Young, MemoryPause),
    PAR_NEW,
    EventType::serial("ParNew (promotion failed)", Young, MemoryPause),
    EventType::serial("ASParNew", Young, MemoryPause),
    EventType::serial("PSYoungGen", Young, MemoryPause),
    YG_OCCUPANCY,
    // tenured collectors
    EventType::serial("Tenured", Tenured, MemoryPause),
    EventType::serial("PSOldGen", Tenured, MemoryPause),
    EventType::serial("ParOldGen", Tenured, MemoryPause),
    EventType::serial("CMS", Tenured, MemoryPause),
    EventType::serial("ASCMS", Tenured, MemoryPause),
    EventType::serial("CMS (concurrent mode failure)", Tenured, MemoryPause),
    EventType::serial("CMS (concurrent mode interrupted)", Tenured, MemoryPause),
    EventType::serial("CMS-initial-mark", Tenured, Memory),
    EventType::serial("1 CMS-initial-mark", Tenured, Memory),
    EventType::serial("CMS-remark", Tenured, Memory),
    CMS_REMARK,
    // perm
    EventType::serial("Perm", Perm, Memory),
    EventType::serial("PSPermGen", Perm, Memory),
    EventType::serial("CMS Perm", Perm, Memory),
    // remark sub-phases
    EventType::serial("Rescan (parallel)", Other, Pause),
    EventType::serial("Rescan (non-parallel)", Other, Pause),
    EventType::serial("grey object rescan", Other, Pause),
    EventType::serial("root rescan", Other, Pause),
    EventType::serial("weak refs processing", Other, Pause),
    EventType::serial("class unloading", Other, Pause),
    EventType::serial("scrub symbol & string tables", Other, Pause),
    EventType::serial("scrub symbol table", Other, Pause),
    EventType::serial("scrub string table", Other, Pause),
    // CMS concurrent phases
    CMS_CONCURRENT_MARK_START,
    CMS_CONCURRENT_MARK,
    EventType::concurrent("CMS-concurrent-preclean-start", Tag),
    EventType::concurrent("CMS-concurrent-preclean", PausePair),
    EventType::concurrent("CMS-concurrent-abortable-preclean-start", Tag),
    EventType::concurrent("CMS-concurrent-abortable-preclean", PausePair),
    EventType::concurrent("CMS-concurrent-sweep-start", Tag),
    EventType::concurrent("CMS-concurrent-sweep", PausePair),
    EventType::concurrent("CMS-concurrent-reset-start", Tag),
    EventType::concurrent("CMS-concurrent-reset", PausePair),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_prefers_longest_entry() {
        let (t, len) = EventType::match_prefix("CMS-concurrent-mark-start]").unwrap();
        assert_eq!(t, CMS_CONCURRENT_MARK_START);
        assert_eq!(len, "CMS-concurrent-mark-start".len());

        let (t, _) = EventType::match_prefix("CMS-concurrent-mark: 0.1/0.2 secs]").unwrap();
        assert_eq!(t, CMS_CONCURRENT_MARK);
    }

    #[test]
    fn test_match_full_gc_variants() {
        let (t, _) = EventType::match_prefix("Full GC (System) [PSYoungGen").unwrap();
        assert_eq!(t.name, "Full GC (System)");
        assert_eq!(t.generation, Generation::All);

        let (t, _) = EventType::match_prefix("Full GC 100K->50K(200K)").unwrap();
        assert_eq!(t, FULL_GC);
    }

    #[test]
    fn test_match_tolerates_missing_space_before_paren() {
        let (t, len) = EventType::match_prefix("ParNew(promotion failed): 900K").unwrap();
        assert_eq!(t.name, "ParNew (promotion failed)");
        assert_eq!(len, "ParNew(promotion failed)".len());
    }

    #[test]
    fn test_match_requires_tag_boundary() {
        assert!(EventType::match_prefix("CMS-concurrent-unknown: 1/2 secs]").is_none());
        assert!(EventType::match_prefix("GCfoo 1K->1K(2K)").is_none());
        assert!(EventType::match_prefix("Times: user=0.00").is_none());
    }

    #[test]
    fn test_match_allows_colon_and_digits_after_tag() {
        let (t, len) = EventType::match_prefix("ParNew: 900K->100K(1000K)").unwrap();
        assert_eq!(t, PAR_NEW);
        assert_eq!(len, 6);
        let (t, _) = EventType::match_prefix("GC 1024K->512K(2048K)").unwrap();
        assert_eq!(t, GC);
    }

    #[test]
    fn test_concurrent_attributes() {
        assert!(CMS_CONCURRENT_MARK.is_concurrent());
        assert_eq!(CMS_CONCURRENT_MARK_START.pattern, GcPattern::Tag);
        assert!(!PAR_NEW.is_concurrent());
        let (cms_perm, _) = EventType::match_prefix("CMS Perm : 10K->10K(20K)]").unwrap();
        assert_eq!(cms_perm.generation, Generation::Perm);
    }

    #[test]
    fn test_table_names_unique() {
        for (i, a) in EVENT_TYPES.iter().enumerate() {
            for b in &EVENT_TYPES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
