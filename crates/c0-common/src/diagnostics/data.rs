//! The closed diagnostic code table.
//!
//! Every externally visible code is declared here with its severity and
//! message template. The table is sorted by code so lookup can bisect.

use super::Severity;

/// One row of the code table.
#[derive(Clone, Copy, Debug)]
pub struct MessageEntry {
    pub code: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

const E: Severity = Severity::Error;
const W: Severity = Severity::Warning;

/// All diagnostic codes, sorted by code string.
pub static MESSAGES: &[MessageEntry] = &[
    MessageEntry { code: "E-CNF-0103", severity: E, message: "identifier uses the reserved `gen_` prefix" },
    MessageEntry { code: "E-CNF-0104", severity: E, message: "identifier uses the reserved `cursive` prefix" },
    MessageEntry { code: "E-CNF-0201", severity: E, message: "module-level name `{name}` is a keyword" },
    MessageEntry { code: "E-CNF-0202", severity: E, message: "module-level name `{name}` shadows a primitive type" },
    MessageEntry { code: "E-CNF-0203", severity: E, message: "module-level name `{name}` shadows a special type" },
    MessageEntry { code: "E-CNF-0204", severity: E, message: "module-level name `{name}` shadows an async type" },
    MessageEntry { code: "E-MOD-1204", severity: E, message: "using clause does not resolve to an item or module" },
    MessageEntry { code: "E-MOD-1205", severity: E, message: "public using re-exports an item that is not public" },
    MessageEntry { code: "E-MOD-1206", severity: E, message: "duplicate name in using list" },
    MessageEntry { code: "E-MOD-1207", severity: E, message: "item is not accessible from this module" },
    MessageEntry { code: "E-MOD-1208", severity: E, message: "using path is ambiguous between an item and a module" },
    MessageEntry { code: "E-MOD-1301", severity: E, message: "pattern binds the same name more than once" },
    MessageEntry { code: "E-MOD-1302", severity: E, message: "duplicate top-level name" },
    MessageEntry { code: "E-MOD-1303", severity: E, message: "identifier does not resolve to a value" },
    MessageEntry { code: "E-MOD-1304", severity: E, message: "qualified name does not resolve" },
    MessageEntry { code: "E-MOD-1306", severity: E, message: "item reference does not resolve" },
    MessageEntry { code: "E-MOD-1401", severity: E, message: "eager initialization dependencies form a cycle" },
    MessageEntry { code: "E-MOD-2440", severity: E, message: "`protected` is not permitted on a top-level item" },
    MessageEntry { code: "E-OUT-0401", severity: E, message: "failed to create output directory `{path}`" },
    MessageEntry { code: "E-OUT-0402", severity: E, message: "failed to emit object file `{path}`" },
    MessageEntry { code: "E-OUT-0403", severity: E, message: "`llvm-as` was not found or IR emission failed" },
    MessageEntry { code: "E-OUT-0404", severity: E, message: "linking failed" },
    MessageEntry { code: "E-OUT-0405", severity: E, message: "`lld-link` was not found" },
    MessageEntry { code: "E-OUT-0406", severity: E, message: "output path collision or escape from the output root" },
    MessageEntry { code: "E-OUT-0407", severity: E, message: "runtime library `runtime/cursive0_rt.lib` is missing" },
    MessageEntry { code: "E-OUT-0408", severity: E, message: "runtime library is missing required symbol `{symbol}`" },
    MessageEntry { code: "E-PRJ-0101", severity: E, message: "no `Cursive.toml` found for this project" },
    MessageEntry { code: "E-PRJ-0102", severity: E, message: "`Cursive.toml` could not be parsed" },
    MessageEntry { code: "E-REG-0001", severity: E, message: "allocation `^` outside of any region" },
    MessageEntry { code: "E-REG-0002", severity: E, message: "pointer escapes the region that owns it" },
    MessageEntry { code: "E-REG-0003", severity: E, message: "use of a pointer whose region has exited" },
    MessageEntry { code: "E-REG-0004", severity: E, message: "frame is not contained in a region" },
    MessageEntry { code: "E-REG-0005", severity: E, message: "`{name}` does not name an enclosing region" },
    MessageEntry { code: "E-TYP-1501", severity: E, message: "type does not implement all members of class `{class}`" },
    MessageEntry { code: "E-TYP-1504", severity: E, message: "inherited methods conflict in signature" },
    MessageEntry { code: "E-TYP-1505", severity: E, message: "class hierarchy has no consistent linearization" },
    MessageEntry { code: "E-TYP-1507", severity: E, message: "inherited fields conflict in type" },
    MessageEntry { code: "E-TYP-1601", severity: E, message: "range indexing requires a bitcopy element type" },
    MessageEntry { code: "E-TYP-1602", severity: E, message: "slices cannot be indexed directly by `usize`" },
    MessageEntry { code: "E-TYP-1603", severity: E, message: "array index must be a compile-time constant" },
    MessageEntry { code: "W-REG-0001", severity: W, message: "pointer may escape its region" },
];

/// Look up a code row; `None` for codes outside the taxonomy.
#[must_use]
pub fn lookup_entry(code: &str) -> Option<&'static MessageEntry> {
    MESSAGES
        .binary_search_by(|entry| entry.code.cmp(code))
        .ok()
        .map(|idx| &MESSAGES[idx])
}

/// Message template for a code.
#[must_use]
pub fn message_for_code(code: &str) -> Option<&'static str> {
    lookup_entry(code).map(|entry| entry.message)
}

/// Severity for a code.
#[must_use]
pub fn severity_for_code(code: &str) -> Option<Severity> {
    lookup_entry(code).map(|entry| entry.severity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_code() {
        for pair in MESSAGES.windows(2) {
            assert!(pair[0].code < pair[1].code, "{} !< {}", pair[0].code, pair[1].code);
        }
    }

    #[test]
    fn codes_match_the_external_pattern() {
        for entry in MESSAGES {
            let bytes = entry.code.as_bytes();
            assert_eq!(bytes.len(), 10, "{}", entry.code);
            assert!(matches!(bytes[0], b'E' | b'W' | b'V'), "{}", entry.code);
            assert_eq!(bytes[1], b'-');
            assert!(bytes[2..5].iter().all(u8::is_ascii_uppercase), "{}", entry.code);
            assert_eq!(bytes[5], b'-');
            assert!(bytes[6..10].iter().all(u8::is_ascii_digit), "{}", entry.code);
        }
    }

    #[test]
    fn lookup_hits_and_misses() {
        assert!(lookup_entry("E-PRJ-0101").is_some());
        assert!(lookup_entry("E-ZZZ-9999").is_none());
        assert_eq!(severity_for_code("W-REG-0001"), Some(Severity::Warning));
    }
}
