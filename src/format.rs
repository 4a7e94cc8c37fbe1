use crate::settings::Precision;

/// Formats elapsed milliseconds as "MM:SS.cc" or "MM:SS.mmm" depending on
/// the precision setting. Minutes keep growing past 99.
pub fn elapsed(ms: u64, precision: Precision) -> String {
    let total_secs = ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    match precision {
        Precision::Milliseconds => {
            format!("{:02}:{:02}.{:03}", minutes, seconds, ms % 1000)
        }
        Precision::Centiseconds => {
            format!("{:02}:{:02}.{:02}", minutes, seconds, (ms % 1000) / 10)
        }
    }
}

/// Session-clock rendering, "M:SS" with no sub-second digits.
pub fn session(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}
