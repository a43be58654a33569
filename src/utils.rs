#[inline(always)]
pub fn run_before_and_after_if_changed<
    'a,
    Object: 'a,
    Value: PartialEq + Copy + std::fmt::Debug + 'static,
    ChangeResult,
>(
    obj: &mut Object,
    calc: impl Fn(&Object) -> Value,
    maybe_change: impl FnOnce(&mut Object) -> ChangeResult,
    callback: impl FnOnce(&Object, &Value, &Value),
) -> ChangeResult {
    let before = calc(obj);
    let result = maybe_change(obj);
    let after = calc(obj);
    if before != after {
        callback(obj, &before, &after);
    }
    result
}

/// `value * numerator / denominator` without intermediate overflow.
pub fn mul_ratio(value: u64, numerator: u64, denominator: u64) -> u64 {
    debug_assert!(denominator > 0);
    let r = value as u128 * numerator as u128 / denominator as u128;
    r.min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::{mul_ratio, run_before_and_after_if_changed};

    #[test]
    fn test_mul_ratio() {
        assert_eq!(mul_ratio(10, 7, 10), 7);
        assert_eq!(mul_ratio(3, 7, 10), 2);
        assert_eq!(mul_ratio(u64::MAX, 1, 1), u64::MAX);
        assert_eq!(mul_ratio(u64::MAX, 17, 20), (u64::MAX as u128 * 17 / 20) as u64);
    }

    #[test]
    fn test_callback_only_on_change() {
        let mut v = 5u32;
        let mut called = false;
        run_before_and_after_if_changed(&mut v, |v| *v, |_| (), |_, _, _| called = true);
        assert!(!called);

        run_before_and_after_if_changed(
            &mut v,
            |v| *v,
            |v| *v = 6,
            |_, before, after| {
                assert_eq!((*before, *after), (5, 6));
                called = true;
            },
        );
        assert!(called);
    }
}
