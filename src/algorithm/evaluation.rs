use super::AlignmentElement;

/// Unit-cost edit distance between two edit scripts.
pub fn edit_distance(expected: &[AlignmentElement], actual: &[AlignmentElement]) -> usize {
    let mut previous: Vec<usize> = (0..=actual.len()).collect();
    let mut current = vec![0; actual.len() + 1];
    for (i, expected_element) in expected.iter().enumerate() {
        current[0] = i + 1;
        for (j, actual_element) in actual.iter().enumerate() {
            let substitution = previous[j] + usize::from(expected_element != actual_element);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[actual.len()]
}

#[cfg(test)]
mod test {
    use super::*;
    use AlignmentElement::*;

    #[test]
    fn distances() {
        assert_eq!(edit_distance(&[], &[]), 0);
        assert_eq!(edit_distance(&[Match, Match], &[]), 2);
        assert_eq!(edit_distance(&[], &[Insertion]), 1);
        assert_eq!(edit_distance(&[Match, Insertion, Match], &[Match, Insertion, Match]), 0);
        assert_eq!(edit_distance(&[Match, Insertion, Match], &[Match, Deletion, Match]), 1);
        assert_eq!(edit_distance(&[Match, Insertion, Match], &[Insertion, Match, Match]), 2);
        assert_eq!(
            edit_distance(&[Match, Match, Deletion, Match], &[Deletion, Match, Match, Match, Insertion]),
            3
        );
    }
}
