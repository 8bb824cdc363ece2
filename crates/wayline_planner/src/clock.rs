use jiff::SignedDuration;
use jiff::civil::Time;

pub(crate) fn minutes(value: f64) -> SignedDuration {
    SignedDuration::from_secs_f64(value * 60.0)
}

/// Rounded to the nearest whole minute.
pub(crate) fn whole_minutes(duration: SignedDuration) -> i64 {
    (duration.as_secs_f64() / 60.0).round() as i64
}

pub(crate) fn format_hm(time: Time) -> String {
    time.strftime("%H:%M").to_string()
}
