//! Source splicing helpers used when emitting rewritten modules

use std::ops::Range;

/// Replace `range` of the original source with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(at..at, text)
    }

    pub fn remove(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }
}

/// Apply non-overlapping edits to `source`
///
/// Edits may be given in any order. Insertions at the same offset keep their
/// relative order.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in edits {
        let start = edit.range.start.max(cursor);
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.text);
        cursor = edit.range.end.max(start);
    }
    out.push_str(&source[cursor..]);
    out
}

/// Pick `desired`, or `desired0`, `desired1`, ... until `is_taken` says it is free
pub fn choose_name(desired: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = desired.to_string();
    let mut counter = 0;
    while is_taken(&candidate) {
        candidate = format!("{}{}", desired, counter);
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_edits_out_of_order() {
        let source = "@contains(string) name;";
        let out = apply_edits(
            source,
            vec![Edit::replace(18..22, "title"), Edit::remove(0..18)],
        );
        assert_eq!(out, "title;");
    }

    #[test]
    fn test_apply_edits_insertions_keep_order() {
        let out = apply_edits("ab", vec![Edit::insert(1, "1"), Edit::insert(1, "2")]);
        assert_eq!(out, "a12b");
    }

    #[test]
    fn test_choose_name_skips_taken() {
        let taken = ["TitleField", "TitleField0"];
        assert_eq!(choose_name("TitleField", |n| taken.contains(&n)), "TitleField1");
        assert_eq!(choose_name("BodyField", |n| taken.contains(&n)), "BodyField");
    }
}
