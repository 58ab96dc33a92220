use std::time::Duration;

/// Standard typing-test word length
pub const CHARS_PER_WORD: f64 = 5.0;

/// Correct characters per minute; zero until any time has elapsed
pub fn cpm(correct_chars: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    correct_chars as f64 * 60.0 / secs
}

pub fn wpm_from_cpm(cpm: f64) -> f64 {
    cpm / CHARS_PER_WORD
}

pub fn wpm(correct_chars: usize, elapsed: Duration) -> f64 {
    wpm_from_cpm(cpm(correct_chars, elapsed))
}

/// Percentage of typed characters that were correct
pub fn accuracy(correct_chars: usize, typed_chars: usize) -> f64 {
    match typed_chars {
        0 => 0.0,
        n => correct_chars as f64 / n as f64 * 100.0,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpm() {
        assert_eq!(cpm(7, Duration::from_secs(10)), 42.0);
        assert_eq!(cpm(2, Duration::from_secs(60)), 2.0);
        assert_eq!(cpm(300, Duration::from_secs(30)), 600.0);
    }

    #[test]
    fn test_cpm_zero_elapsed() {
        assert_eq!(cpm(10, Duration::ZERO), 0.0);
    }

    #[test]
    fn test_wpm_uses_five_char_words() {
        assert_eq!(wpm(7, Duration::from_secs(10)), 8.4);
        assert_eq!(wpm_from_cpm(250.0), 50.0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(3, 4), 75.0);
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(5, 5), 100.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(8.4049), 8.4);
        assert_eq!(round2(41.996), 42.0);
    }
}
