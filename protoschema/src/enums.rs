//! Enum ordinal assignment.

use std::collections::BTreeSet;

use crate::extract::EnumValueInfo;
use crate::proto::EnumValue;

/// Assign ordinals to enum values in declaration order.
///
/// An explicit ordinal is used as is. An unmarked value takes the lowest
/// ordinal not assigned so far, starting at 0. Explicit ordinals declared
/// later are not looked ahead at, so `[A, B = 5, C]` yields `A = 0, B = 5,
/// C = 1` and `[A, B = 0]` yields two values numbered 0. Keeping explicit
/// ordinals unique is left to the model author.
pub fn assign_ordinals(values: &[EnumValueInfo]) -> Vec<EnumValue> {
    let mut used = BTreeSet::new();
    let mut assigned = Vec::with_capacity(values.len());

    for value in values {
        let number = match value.number {
            Some(number) => number,
            None => lowest_unused(&used),
        };
        used.insert(number);
        assigned.push(EnumValue {
            name: value.name.clone(),
            number,
        });
    }

    assigned
}

fn lowest_unused(used: &BTreeSet<i32>) -> i32 {
    let mut candidate = 0;
    for &number in used.range(0..) {
        if number != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(name: &str, number: Option<i32>) -> EnumValueInfo {
        EnumValueInfo {
            name: name.to_string(),
            number,
        }
    }

    fn numbers(values: &[EnumValueInfo]) -> Vec<(String, i32)> {
        assign_ordinals(values)
            .into_iter()
            .map(|v| (v.name, v.number))
            .collect()
    }

    #[test]
    fn test_implicit_ordinals_start_at_zero() {
        let values = [value("A", None), value("B", None), value("C", None)];
        assert_eq!(
            numbers(&values),
            vec![("A".into(), 0), ("B".into(), 1), ("C".into(), 2)]
        );
    }

    #[test]
    fn test_explicit_ordinal_between_implicit_values() {
        let values = [value("A", None), value("B", Some(5)), value("C", None)];
        assert_eq!(
            numbers(&values),
            vec![("A".into(), 0), ("B".into(), 5), ("C".into(), 1)]
        );
    }

    #[test]
    fn test_explicit_first_value() {
        let values = [value("A", Some(0)), value("B", None)];
        assert_eq!(numbers(&values), vec![("A".into(), 0), ("B".into(), 1)]);

        let values = [value("A", Some(2)), value("B", None), value("C", None), value("D", None)];
        assert_eq!(
            numbers(&values),
            vec![("A".into(), 2), ("B".into(), 0), ("C".into(), 1), ("D".into(), 3)]
        );
    }

    #[test]
    fn test_negative_explicit_ordinal_ignored_for_gaps() {
        let values = [value("A", Some(-1)), value("B", None)];
        assert_eq!(numbers(&values), vec![("A".into(), -1), ("B".into(), 0)]);
    }

    #[test]
    fn test_later_explicit_collision_is_kept() {
        let values = [value("A", None), value("B", Some(0))];
        assert_eq!(numbers(&values), vec![("A".into(), 0), ("B".into(), 0)]);
    }
}
