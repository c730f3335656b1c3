// Identifier cleanup.
//
// Inventory cells sometimes arrive as pre-serialized JSON fragments
// (`["42"]`, `"R1"`). Node ids and file names are scrubbed of the
// bracket and quote characters before they are used downstream.

const STRIPPED: [char; 3] = ['[', ']', '"'];

/// Remove every `[`, `]` and `"` from `value`.
///
/// Idempotent: a clean string comes back unchanged.
pub fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !STRIPPED.contains(c)).collect()
}
