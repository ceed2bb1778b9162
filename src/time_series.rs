/// Speed of one completed word, plotted against its position in the paragraph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub word: f64,
    pub wpm: f64,
}

impl TimeSeriesPoint {
    pub fn new(word: f64, wpm: f64) -> Self {
        Self { word, wpm }
    }
}

impl From<TimeSeriesPoint> for (f64, f64) {
    fn from(p: TimeSeriesPoint) -> Self {
        (p.word, p.wpm)
    }
}
