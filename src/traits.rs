/// Provides functionality to format byte counts into human-readable strings with binary units.
///
/// Values below 1 KiB are printed as a plain byte count; larger values are scaled to
/// the biggest unit (up to PiB) that keeps the number at or above 1, with one decimal place.
///
/// # Examples
///
/// ```
/// use biggest::traits::ByteSize;
/// assert_eq!(512_u64.format_size(), "512 B");
/// assert_eq!(1536_u64.format_size(), "1.5 KiB");
/// assert_eq!((1024_u64 * 1024 * 1024).format_size(), "1.0 GiB");
/// ```
pub trait ByteSize {
    fn format_size(&self) -> String;
}

impl ByteSize for u64 {
    fn format_size(&self) -> String {
        const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

        if *self < 1024 {
            return format!("{} B", self);
        }

        let mut value = *self as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{:.1} {}", value, UNITS[unit])
    }
}
