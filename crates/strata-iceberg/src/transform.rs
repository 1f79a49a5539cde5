//! Partition transform evaluation.

use chrono::{Datelike, NaiveDate};

use crate::error::{SinkError, SinkResult};
use crate::hash;
use crate::types::{Literal, Transform};

const MICROS_PER_HOUR: i64 = 3_600_000_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;
/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Applies a transform to one source value.
///
/// Null input yields null output for every transform. `pos` is the partition
/// field position, used in error messages.
///
/// # Errors
///
/// Returns [`SinkError::TypeMismatch`] if the value type is not accepted by
/// the transform, [`SinkError::InvalidPartitionSpec`] for a bucket count or
/// truncate width outside `1..=i32::MAX`, or
/// [`SinkError::UnsupportedTransform`] for [`Transform::Unknown`].
pub fn apply(
    transform: &Transform,
    pos: usize,
    value: Option<&Literal>,
) -> SinkResult<Option<Literal>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let result = match transform {
        Transform::Identity => value.clone(),
        Transform::Void => return Ok(None),
        Transform::Bucket(n) => {
            check_width(transform, *n)?;
            Literal::Int(hash::bucket_of(bucket_hash(pos, value)?, *n))
        }
        Transform::Truncate(width) => {
            check_width(transform, *width)?;
            truncate(pos, *width, value)?
        }
        Transform::Year => Literal::Int(epoch_years(pos, value)?),
        Transform::Month => Literal::Int(epoch_months(pos, value)?),
        Transform::Day => Literal::Date(epoch_days(pos, value)?),
        Transform::Hour => match value {
            Literal::Timestamp(micros) => {
                Literal::Int(to_i32(pos, micros.div_euclid(MICROS_PER_HOUR))?)
            }
            other => return Err(mismatch(pos, "timestamp", other)),
        },
        Transform::Unknown(name) => {
            return Err(SinkError::UnsupportedTransform {
                transform: name.clone(),
                source_type: value.type_name().to_string(),
            });
        }
    };

    Ok(Some(result))
}

fn check_width(transform: &Transform, n: u32) -> SinkResult<()> {
    if n == 0 || i32::try_from(n).is_err() {
        return Err(SinkError::invalid_spec(format!("invalid transform {transform}")));
    }
    Ok(())
}

fn mismatch(pos: usize, expected: &str, value: &Literal) -> SinkError {
    SinkError::type_mismatch(pos, expected, value.type_name())
}

fn to_i32(pos: usize, value: i64) -> SinkResult<i32> {
    i32::try_from(value)
        .map_err(|_| SinkError::type_mismatch(pos, "value in int range", value.to_string()))
}

fn bucket_hash(pos: usize, value: &Literal) -> SinkResult<i32> {
    let hashed = match value {
        Literal::Int(v) | Literal::Date(v) => hash::hash_int(*v),
        Literal::Long(v) | Literal::Time(v) | Literal::Timestamp(v) => hash::hash_long(*v),
        Literal::String(s) => hash::hash_str(s),
        Literal::Binary(b) => hash::hash_bytes(b),
        Literal::Decimal { unscaled, .. } => hash::hash_decimal(*unscaled),
        other => {
            return Err(mismatch(
                pos,
                "int, long, date, time, timestamp, string, binary or decimal",
                other,
            ));
        }
    };
    hashed.map_err(|e| {
        strata_core::Error::serialization_with_source("failed to hash bucket source value", e)
            .into()
    })
}

fn truncate(pos: usize, width: u32, value: &Literal) -> SinkResult<Literal> {
    let width_usize = usize::try_from(width).unwrap_or(usize::MAX);
    match value {
        Literal::Int(v) => {
            let w = i32::try_from(width)
                .map_err(|_| mismatch(pos, "truncate width in int range", value))?;
            Ok(Literal::Int(v.wrapping_sub(v.rem_euclid(w))))
        }
        Literal::Long(v) => {
            let w = i64::from(width);
            Ok(Literal::Long(v.wrapping_sub(v.rem_euclid(w))))
        }
        Literal::Decimal { unscaled, scale } => {
            let w = i128::from(width);
            Ok(Literal::Decimal {
                unscaled: unscaled.wrapping_sub(unscaled.rem_euclid(w)),
                scale: *scale,
            })
        }
        Literal::String(s) => Ok(Literal::String(s.chars().take(width_usize).collect())),
        Literal::Binary(b) => Ok(Literal::Binary(b.iter().take(width_usize).copied().collect())),
        other => Err(mismatch(pos, "int, long, decimal, string or binary", other)),
    }
}

fn epoch_days(pos: usize, value: &Literal) -> SinkResult<i32> {
    match value {
        Literal::Date(days) => Ok(*days),
        Literal::Timestamp(micros) => to_i32(pos, micros.div_euclid(MICROS_PER_DAY)),
        other => Err(mismatch(pos, "date or timestamp", other)),
    }
}

fn calendar_date(pos: usize, value: &Literal) -> SinkResult<NaiveDate> {
    let days = epoch_days(pos, value)?;
    days.checked_add(EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| mismatch(pos, "date in calendar range", value))
}

fn epoch_years(pos: usize, value: &Literal) -> SinkResult<i32> {
    Ok(calendar_date(pos, value)?.year() - 1970)
}

#[allow(clippy::cast_possible_wrap)]
fn epoch_months(pos: usize, value: &Literal) -> SinkResult<i32> {
    let date = calendar_date(pos, value)?;
    Ok((date.year() - 1970) * 12 + date.month0() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2017-11-16 and 2017-11-16T22:31:08
    const DATE_DAYS: i32 = 17_486;
    const TS_MICROS: i64 = 1_510_871_468_000_000;

    fn eval(transform: Transform, value: Literal) -> Option<Literal> {
        apply(&transform, 0, Some(&value)).expect("transform")
    }

    #[test]
    fn test_null_in_null_out() {
        for t in [Transform::Identity, Transform::Bucket(4), Transform::Day, Transform::Void] {
            assert_eq!(apply(&t, 0, None).unwrap(), None);
        }
    }

    #[test]
    fn test_bucket_matches_iceberg_reference() {
        // hash(34) = 2017239379
        assert_eq!(
            eval(Transform::Bucket(16), Literal::Int(34)),
            Some(Literal::Int(2_017_239_379 % 16))
        );
        assert_eq!(
            eval(Transform::Bucket(16), Literal::Long(34)),
            Some(Literal::Int(2_017_239_379 % 16))
        );
        // hash("iceberg") = 1210000089
        assert_eq!(
            eval(Transform::Bucket(100), Literal::String("iceberg".into())),
            Some(Literal::Int(1_210_000_089 % 100))
        );
    }

    #[test]
    fn test_bucket_decimal_hashes_unscaled_value() {
        // hash(14.20) = -500754589
        let expected = (-500_754_589_i32 & i32::MAX) % 8;
        let amount = Literal::Decimal {
            unscaled: 1420,
            scale: 2,
        };
        assert_eq!(eval(Transform::Bucket(8), amount), Some(Literal::Int(expected)));
    }

    #[test]
    fn test_truncate_decimal_keeps_scale() {
        let decimal = |unscaled| Literal::Decimal { unscaled, scale: 2 };
        // 10.65 -> 10.50 and -0.05 -> -0.50 with width 50
        assert_eq!(eval(Transform::Truncate(50), decimal(1065)), Some(decimal(1050)));
        assert_eq!(eval(Transform::Truncate(50), decimal(-5)), Some(decimal(-50)));
        assert_eq!(eval(Transform::Truncate(10), decimal(1420)), Some(decimal(1420)));
    }

    #[test]
    fn test_bucket_rejects_floating_point() {
        let err = apply(&Transform::Bucket(8), 2, Some(&Literal::Double(1.5))).unwrap_err();
        assert!(matches!(err, SinkError::TypeMismatch { position: 2, .. }));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(eval(Transform::Truncate(10), Literal::Int(15)), Some(Literal::Int(10)));
        assert_eq!(eval(Transform::Truncate(10), Literal::Int(-1)), Some(Literal::Int(-10)));
        assert_eq!(eval(Transform::Truncate(10), Literal::Long(-15)), Some(Literal::Long(-20)));
        assert_eq!(
            eval(Transform::Truncate(3), Literal::String("iceberg".into())),
            Some(Literal::String("ice".into()))
        );
        assert_eq!(
            eval(Transform::Truncate(2), Literal::Binary(vec![1, 2, 3])),
            Some(Literal::Binary(vec![1, 2]))
        );
    }

    #[test]
    fn test_time_transforms_on_date() {
        assert_eq!(eval(Transform::Year, Literal::Date(DATE_DAYS)), Some(Literal::Int(47)));
        assert_eq!(
            eval(Transform::Month, Literal::Date(DATE_DAYS)),
            Some(Literal::Int(47 * 12 + 10))
        );
        assert_eq!(eval(Transform::Day, Literal::Date(DATE_DAYS)), Some(Literal::Date(DATE_DAYS)));
    }

    #[test]
    fn test_time_transforms_on_timestamp() {
        assert_eq!(
            eval(Transform::Day, Literal::Timestamp(TS_MICROS)),
            Some(Literal::Date(DATE_DAYS))
        );
        assert_eq!(
            eval(Transform::Hour, Literal::Timestamp(TS_MICROS)),
            Some(Literal::Int(DATE_DAYS * 24 + 22))
        );
        assert_eq!(eval(Transform::Year, Literal::Timestamp(TS_MICROS)), Some(Literal::Int(47)));
    }

    #[test]
    fn test_pre_epoch_timestamp_floors() {
        // One microsecond before the epoch is day -1, hour -1, year -1.
        assert_eq!(eval(Transform::Day, Literal::Timestamp(-1)), Some(Literal::Date(-1)));
        assert_eq!(eval(Transform::Hour, Literal::Timestamp(-1)), Some(Literal::Int(-1)));
        assert_eq!(eval(Transform::Year, Literal::Timestamp(-1)), Some(Literal::Int(-1)));
        assert_eq!(eval(Transform::Month, Literal::Timestamp(-1)), Some(Literal::Int(-1)));
    }

    #[test]
    fn test_zero_width_is_rejected() {
        assert!(apply(&Transform::Bucket(0), 0, Some(&Literal::Int(1))).is_err());
        assert!(apply(&Transform::Truncate(0), 0, Some(&Literal::Long(1))).is_err());
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        let zorder = Transform::Unknown("zorder".into());
        let err = apply(&zorder, 0, Some(&Literal::Int(1))).unwrap_err();
        assert_eq!(err.to_string(), "transform zorder cannot be applied to int");
    }
}
