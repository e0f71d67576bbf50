use std::collections::HashMap;

use crate::model::RawCell;

/// Most frequent keyword that starts with an uppercase letter.
///
/// A rough stand-in for "keywords that mention a proper noun". Exact string
/// equality, ties go to the keyword seen first.
pub fn extract_capitalized(keywords: &[RawCell]) -> Option<String> {
    // keyword -> (first position, count)
    let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();

    for (pos, cell) in keywords.iter().enumerate() {
        let RawCell::Text(text) = cell else { continue };
        if !text.chars().next().is_some_and(char::is_uppercase) {
            continue;
        }
        seen.entry(text.as_str()).or_insert((pos, 0)).1 += 1;
    }

    seen.into_iter()
        .max_by(|(_, (pos_a, count_a)), (_, (pos_b, count_b))| {
            count_a.cmp(count_b).then(pos_b.cmp(pos_a))
        })
        .map(|(text, _)| text.to_string())
}
