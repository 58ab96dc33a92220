#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub t: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(t: f64, wpm: f64) -> Self {
        Self { t, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.t, p.wpm)
    }
}

/// Live wpm samples taken while a session runs, at most one per whole second
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample when `t` has crossed into a new whole second.
    /// Returns true if the sample was kept.
    pub fn record(&mut self, t: f64, wpm: f64) -> bool {
        if t < 1.0 {
            return false;
        }
        let second = t.floor();
        match self.points.last() {
            Some(last) if last.t >= second => false,
            _ => {
                self.points.push(TimeSeriesPoint::new(second, wpm));
                true
            }
        }
    }

    /// Records the closing sample at the exact final time, replacing a
    /// sample for the same second.
    pub fn close(&mut self, t: f64, wpm: f64) {
        if t <= 0.0 {
            return;
        }
        if let Some(last) = self.points.last() {
            if last.t >= t.floor() {
                self.points.pop();
            }
        }
        self.points.push(TimeSeriesPoint::new(t, wpm));
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn as_tuples(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|&p| p.into()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
