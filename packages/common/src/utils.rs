use decimal::Decimal;

/// Returns `Err($err)` from the enclosing function as soon as one of the
/// values is zero or negative.
#[macro_export]
macro_rules! ensure_positive {
    ($err:expr; $($arg:expr),+ $(,)?) => {
        {
            $(
                let value: i128 = Into::<i128>::into($arg);
                if value <= 0 {
                    return Err($err);
                }
            )+
        }
    };
}

pub fn assert_approx_ratio(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    let diff = (a - b).abs();
    diff <= tolerance
}
