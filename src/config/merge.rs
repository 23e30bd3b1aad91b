//! Deep merge of literal trees, used to layer a config over its presets.
//!
//! Objects merge key by key with the overlay winning; arrays and scalars are
//! replaced entirely, not concatenated.

use super::literal::Literal;
use std::collections::HashSet;

/// Deep merge two literals, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans, calls are replaced entirely
/// - If overlay is null, the base value is preserved (null means "not specified")
///
/// Duplicate keys on either side stay duplicated in the result, so the
/// validator still sees them.
pub fn deep_merge(base: Literal, overlay: Literal) -> Literal {
    match (base, overlay) {
        (Literal::Object(mut base_entries), Literal::Object(overlay_entries)) => {
            let mut claimed: HashSet<usize> = HashSet::new();
            for (key, overlay_value) in overlay_entries {
                let slot = (0..base_entries.len())
                    .find(|idx| base_entries[*idx].0 == key && !claimed.contains(idx));
                match slot {
                    Some(idx) => {
                        let base_value = std::mem::replace(&mut base_entries[idx].1, Literal::Null);
                        base_entries[idx].1 = deep_merge(base_value, overlay_value);
                        claimed.insert(idx);
                    }
                    None => {
                        claimed.insert(base_entries.len());
                        base_entries.push((key, overlay_value));
                    }
                }
            }
            Literal::Object(base_entries)
        }
        (base, Literal::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple literals in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Literal>) -> Literal {
    values.into_iter().fold(Literal::Null, deep_merge)
}
