//! Tables — literal fragments the line reassembler recognizes.

use std::sync::LazyLock;

use regex::Regex;

/// Lines starting with one of these carry no event data.
pub const EXCLUDE_PREFIXES: &[&str] = &[
    UNLOADING_CLASS,
    "Desired survivor",
    "Application time:",
    "Total time for which application threads were stopped:",
    "- age",
    " [Times",
];

/// `-XX:+TraceClassUnloading`; may also start in the middle of an event line.
pub const UNLOADING_CLASS: &str = "[Unloading class ";

/// Printed by CMS right inside an abortable-preclean line.
pub const CMS_ABORT_PRECLEAN: &str = " CMS: abort preclean due to time ";

pub const YG_OCCUPANCY: &str = "YG occupancy";
pub const PAR_NEW: &str = "ParNew";
pub const DEF_NEW: &str = "DefNew";

/// Line endings after which `-XX:+PrintTenuringDistribution` output follows.
pub const TENURING_OPENINGS: &[&str] = &["[DefNew", "[ParNew", "[ParNew (promotion failed)"];

/// `-XX:+PrintHeapAtGC` block marker.
pub const HEAP_SIZING_START: &str = "Heap";

/// Continuation lines of a heap layout dump.
pub const HEAP_PREFIXES: &[&str] = &[
    "def new generation",
    "PSYoungGen",
    "par new generation",
    "eden space",
    "from space",
    "to   space",
    "ParOldGen",
    "PSOldGen",
    "object space",
    "PSPermGen",
    "tenured generation",
    "the space",
    "ro space",
    "rw space",
    "compacting perm gen",
    "concurrent mark-sweep generation total",
    "concurrent-mark-sweep perm gen",
    "No shared spaces configured.",
    "}",
];

/// `-XX:+PrintAdaptiveSizePolicy` block marker.
pub const ADAPTIVE_SIZE: &str = "AdaptiveSize";

/// Continuation lines of an adaptive-size-policy block.
pub const ADAPTIVE_SIZE_PREFIXES: &[&str] = &["PSAdaptiveSize", "AdaptiveSize", "avg_survived_padded_avg"];

/// Some 1.6 updates glue the start of the next event onto `[CMS`, `[ParNew`
/// or `[DefNew`, e.g. `... [CMS1.234: [CMS-concurrent-mark ...`.
pub static MIXED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.* \[(?:CMS|ParNew|DefNew))([0-9]+[-.].*)$").expect("valid mixed line pattern")
});

/// First line of an adaptive-size block; group 1 is the event start to keep.
pub static ADAPTIVE_SIZE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*GC|.*\(System\))Adaptive.*$").expect("valid adaptive size pattern")
});

pub fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| line.starts_with(p))
}

pub fn ends_with_any(line: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|s| line.ends_with(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_line_groups() {
        let line = "1.0: [GC 1.0: [ParNew: 1K->1K(2K), 0.1 secs]1.1: [CMS1.2: [CMS-concurrent-mark: 0.1/0.2 secs]";
        let caps = MIXED_LINE.captures(line).unwrap();
        assert_eq!(&caps[1], "1.0: [GC 1.0: [ParNew: 1K->1K(2K), 0.1 secs]1.1: [CMS");
        assert_eq!(&caps[2], "1.2: [CMS-concurrent-mark: 0.1/0.2 secs]");
    }

    #[test]
    fn test_mixed_line_with_datestamp() {
        let line = "1.1: [CMS2012-04-26T23:59:50.123+0200: 1.2: [CMS-concurrent-sweep-start]";
        let caps = MIXED_LINE.captures(line).unwrap();
        assert_eq!(&caps[1], "1.1: [CMS");
        assert!(caps[2].starts_with("2012-04-26"));
    }

    #[test]
    fn test_mixed_line_ignores_regular_lines() {
        assert!(!MIXED_LINE.is_match("1.0: [GC 1.0: [ParNew: 900K->100K(1000K), 0.05 secs]"));
        assert!(!MIXED_LINE.is_match("1.0: [CMS-concurrent-mark-start]"));
    }

    #[test]
    fn test_adaptive_size_line() {
        let line = "0.175: [GCAdaptiveSizeStart: 0.186 collection: 1 ";
        let caps = ADAPTIVE_SIZE_LINE.captures(line).unwrap();
        assert_eq!(&caps[1], "0.175: [GC");

        let line = "1.0: [Full GC (System)AdaptiveSizeStart: 1.2 collection: 3 ";
        let caps = ADAPTIVE_SIZE_LINE.captures(line).unwrap();
        assert_eq!(&caps[1], "1.0: [Full GC (System)");

        assert!(!ADAPTIVE_SIZE_LINE.is_match("AdaptiveSizeStop: collection: 1 "));
    }

    #[test]
    fn test_prefix_helpers() {
        assert!(starts_with_any("- age   1:  123 bytes", EXCLUDE_PREFIXES));
        assert!(!starts_with_any("1.0: [GC", EXCLUDE_PREFIXES));
        assert!(ends_with_any("1.0: [GC 1.0: [ParNew", TENURING_OPENINGS));
        assert!(!ends_with_any("1.0: [GC 1.0: [ParNew: 1K", TENURING_OPENINGS));
    }
}
