// Latency scraping from human-readable ping output

use std::fmt;

const TIME_MARKER: &str = "time=";

/// One round-trip time in milliseconds. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Sample(f64);

impl Sample {
    pub fn from_millis(ms: f64) -> Option<Self> {
        (ms.is_finite() && ms >= 0.0).then_some(Self(ms))
    }

    pub fn millis(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ms", self.0)
    }
}

/// Turns raw probe text into a sample.
pub trait OutputParser: Send + Sync + 'static {
    fn parse(&self, text: &str) -> Option<Sample>;
}

/// Reads the number right after the first `time=` marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeMarkerParser;

impl OutputParser for TimeMarkerParser {
    fn parse(&self, text: &str) -> Option<Sample> {
        let idx = text.find(TIME_MARKER)?;
        let rest = &text[idx + TIME_MARKER.len()..];
        let token = rest.split(char::is_whitespace).next()?;
        let ms = token.parse::<f64>().ok()?;
        Sample::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<f64> {
        TimeMarkerParser.parse(text).map(Sample::millis)
    }

    #[test]
    fn test_parse_linux_reply_line() {
        assert_eq!(
            parse("64 bytes from 1.1.1.1: icmp_seq=1 ttl=59 time=14.5 ms"),
            Some(14.5)
        );
    }

    #[test]
    fn test_parse_full_ping_transcript() {
        let output = "PING 1.1.1.1 (1.1.1.1): 56 data bytes\n\
                      64 bytes from 1.1.1.1: icmp_seq=0 ttl=57 time=9.873 ms\n\
                      \n\
                      --- 1.1.1.1 ping statistics ---\n\
                      1 packets transmitted, 1 packets received, 0.0% packet loss\n\
                      round-trip min/avg/max/stddev = 9.873/9.873/9.873/0.000 ms\n";
        assert_eq!(parse(output), Some(9.873));
    }

    #[test]
    fn test_missing_marker() {
        assert_eq!(parse("Request timeout for icmp_seq 0"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_non_numeric_token() {
        assert_eq!(parse("time=abc ms"), None);
    }

    #[test]
    fn test_only_first_marker_counts() {
        assert_eq!(parse("time=bad ms\ntime=12.0 ms"), None);
        assert_eq!(parse("time=3 ms time=40 ms"), Some(3.0));
    }

    #[test]
    fn test_token_ends_at_first_whitespace() {
        assert_eq!(parse("time=7.25\tms"), Some(7.25));
        assert_eq!(parse("time=7.25\nnext line"), Some(7.25));
        assert_eq!(parse("time=7.25"), Some(7.25));
        assert_eq!(parse("time= 7.25 ms"), None);
    }

    #[test]
    fn test_rejects_values_outside_sample_range() {
        assert_eq!(parse("time=-1.0 ms"), None);
        assert_eq!(parse("time=NaN ms"), None);
        assert_eq!(parse("time=inf ms"), None);
    }

    #[test]
    fn test_sample_display() {
        let sample = Sample::from_millis(14.46).unwrap();
        assert_eq!(sample.to_string(), "14.5 ms");
    }
}
