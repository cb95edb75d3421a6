//! Argument reordering for reworded steps.

use crate::value::StepValue;

/// Map each argument of `new` to its position in `old`.
///
/// Arguments are matched by name; an argument absent from `old` maps to
/// `None`. When a name repeats in `old`, the first occurrence wins.
///
/// # Examples
/// ```
/// use stepdown_patterns::{StepValue, arg_position_map};
/// let old = StepValue::new("login {} {}", vec!["user".into(), "pwd".into()]);
/// let new = StepValue::new("use {} for {} at {}", vec!["pwd".into(), "user".into(), "url".into()]);
/// assert_eq!(arg_position_map(&old, &new), vec![Some(1), Some(0), None]);
/// ```
#[must_use]
pub fn arg_position_map(old: &StepValue, new: &StepValue) -> Vec<Option<usize>> {
    new.args
        .iter()
        .map(|arg| old.args.iter().position(|candidate| candidate == arg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_steps_map_to_identity() {
        let value = StepValue::new("{} {}", vec!["a".into(), "b".into()]);
        assert_eq!(arg_position_map(&value, &value), vec![Some(0), Some(1)]);
    }

    #[test]
    fn dropped_arguments_do_not_appear() {
        let old = StepValue::new("{} {}", vec!["a".into(), "b".into()]);
        let new = StepValue::new("{}", vec!["b".into()]);
        assert_eq!(arg_position_map(&old, &new), vec![Some(1)]);
    }
}
