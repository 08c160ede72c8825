// ABOUTME: Natural (numeric-aware) ordering of strings and paths
// ABOUTME: Keeps numbered sequences such as img2/img10 in human order

use std::cmp::Ordering;
use std::path::Path;

/// Compare two strings so that runs of ASCII digits are ordered by value.
///
/// `"img2.png"` sorts before `"img10.png"`. Numbers with equal value but a
/// different number of leading zeros fall back to byte order, which keeps the
/// ordering total.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (mut a_rest, mut b_rest) = (a, b);

    loop {
        match (a_rest.chars().next(), b_rest.chars().next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let (a_num, a_tail) = split_digits(a_rest);
                let (b_num, b_tail) = split_digits(b_rest);
                let ordering = compare_digits(a_num, b_num);
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a_rest = a_tail;
                b_rest = b_tail;
            }
            (Some(ca), Some(cb)) => {
                if ca != cb {
                    return ca.cmp(&cb);
                }
                a_rest = &a_rest[ca.len_utf8()..];
                b_rest = &b_rest[cb.len_utf8()..];
            }
        }
    }
}

pub fn compare_paths(a: &Path, b: &Path) -> Ordering {
    compare(&a.to_string_lossy(), &b.to_string_lossy())
}

pub fn sort_paths<P: AsRef<Path>>(paths: &mut [P]) {
    paths.sort_by(|a, b| compare_paths(a.as_ref(), b.as_ref()));
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(end)
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sort_by_value() {
        let mut files = vec!["img10.png", "img2.png", "img1.png"];
        files.sort_by(|a, b| compare(a, b));
        assert_eq!(files, vec!["img1.png", "img2.png", "img10.png"]);
    }

    #[test]
    fn text_segments_compare_lexically() {
        assert_eq!(compare("a_cat", "a_dog"), Ordering::Less);
        assert_eq!(compare("b1", "a2"), Ordering::Greater);
        assert_eq!(compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_are_not_equal() {
        assert_ne!(compare("x01", "x1"), Ordering::Equal);
        assert_eq!(compare("x01", "x2"), Ordering::Less);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(compare("slide", "slide1"), Ordering::Less);
        assert_eq!(compare("slide9", "slide9a"), Ordering::Less);
    }
}
