use log::warn;

use super::algorithm::Alignment;

/// Checks that `alignment` is an edit script from a sequence of `lengths[0]`
/// elements to one of `lengths[1]` elements.
pub fn validate(alignment: &Alignment, lengths: [usize; 2]) -> Vec<String> {
    let mut errors = vec![];

    let consumed = alignment.consumed();
    for side in 0..2 {
        let side_name = ["first", "second"][side];
        if consumed[side] != lengths[side] {
            errors.push(format!(
                "The alignment consumes {} elements of the {side_name} sequence, but it has {}",
                consumed[side], lengths[side]
            ));
        }
    }

    errors
}

pub fn print_errors(errors: &[String]) {
    if !errors.is_empty() {
        warn!("Alignment validation errors:");
        for error in errors {
            warn!("  {error}");
        }
    }
}
