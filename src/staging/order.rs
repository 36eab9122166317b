//! Natural-order comparison for staged file names.
//!
//! Trial-ordinal prefixes are plain decimal numbers without zero-padding, so
//! lexical byte order would play trial 10 before trial 2. Embedded digit runs
//! compare by numeric value; everything else compares as characters.

use std::cmp::Ordering;

use crate::staging::StagedClip;

/// Compare two names in natural (human) order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let run_a = take_digit_run(&mut ca);
                    let run_b = take_digit_run(&mut cb);
                    match compare_digit_runs(&run_a, &run_b) {
                        Ordering::Equal => continue,
                        other => return other,
                    }
                }

                match x.cmp(&y) {
                    Ordering::Equal => {
                        ca.next();
                        cb.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

/// Sort staged clips in place by natural name order.
pub fn sort_natural(clips: &mut [StagedClip]) {
    clips.sort_by(|a, b| natural_cmp(&a.name, &b.name));
}

fn take_digit_run(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

/// Numeric comparison of two digit runs of arbitrary length.
///
/// Leading zeros are ignored for the value comparison; if the values tie,
/// the run with fewer leading zeros sorts first so the ordering is total.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let sa = a.trim_start_matches('0');
    let sb = b.trim_start_matches('0');

    sa.len()
        .cmp(&sb.len())
        .then_with(|| sa.cmp(sb))
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn clip(name: &str) -> StagedClip {
        StagedClip {
            name: name.to_string(),
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn test_numeric_prefix_beats_lexical_order() {
        assert_eq!(natural_cmp("2_clip.avi", "10_clip.avi"), Ordering::Less);
        assert_eq!(natural_cmp("10_clip.avi", "2_clip.avi"), Ordering::Greater);
    }

    #[test]
    fn test_two_digit_ordinals_sort_ascending() {
        let mut names: Vec<String> = (0..100).rev().map(|i| format!("{}_trial.avi", i)).collect();
        names.sort_by(|a, b| natural_cmp(a, b));

        let expected: Vec<String> = (0..100).map(|i| format!("{}_trial.avi", i)).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_embedded_runs_compare_numerically() {
        assert_eq!(natural_cmp("0_cam2_take9.avi", "0_cam2_take10.avi"), Ordering::Less);
        assert_eq!(natural_cmp("0_cam10_take1.avi", "0_cam2_take1.avi"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros_tie_break_deterministically() {
        assert_eq!(natural_cmp("01_clip.avi", "1_clip.avi"), Ordering::Greater);
        assert_eq!(natural_cmp("007.avi", "007.avi"), Ordering::Equal);
    }

    #[test]
    fn test_plain_text_falls_back_to_char_order() {
        assert_eq!(natural_cmp("alpha.avi", "beta.avi"), Ordering::Less);
        assert_eq!(natural_cmp("clip.avi", "clip.avi"), Ordering::Equal);
    }

    #[test]
    fn test_sort_natural_orders_staged_clips() {
        let mut clips = vec![clip("10_b.avi"), clip("2_a.avi"), clip("1_c.avi")];
        sort_natural(&mut clips);

        let names: Vec<&str> = clips.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["1_c.avi", "2_a.avi", "10_b.avi"]);
    }
}
