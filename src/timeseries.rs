use chrono::Datelike;
use std::collections::BTreeMap;

use crate::models::DataPoint;

/// Downsamples to one point per ISO week, keeping each week's last
/// observation (and its original date). Input must be ascending by date.
pub fn resample_last_weekly(points: &[DataPoint]) -> Vec<DataPoint> {
    resample_last(points, |p| {
        let week = p.date.iso_week();
        (week.year(), week.week())
    })
}

/// Downsamples to one point per calendar month, keeping each month's last
/// observation. Input must be ascending by date.
pub fn resample_last_monthly(points: &[DataPoint]) -> Vec<DataPoint> {
    resample_last(points, |p| (p.date.year(), p.date.month()))
}

fn resample_last<K: Ord>(points: &[DataPoint], bucket: impl Fn(&DataPoint) -> K) -> Vec<DataPoint> {
    let mut buckets: BTreeMap<K, DataPoint> = BTreeMap::new();
    for point in points {
        // ascending input: later inserts overwrite, leaving the bucket's last
        buckets.insert(bucket(point), point.clone());
    }
    buckets.into_values().collect()
}

/// Percent change against the observation `lag` steps earlier, scaled by
/// `factor`. The first `lag` points have no basis and are dropped, as are
/// points whose basis is zero.
pub fn pct_change(points: &[DataPoint], lag: usize, factor: f64) -> Vec<DataPoint> {
    if lag == 0 || points.len() <= lag {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(points.len() - lag);
    for i in lag..points.len() {
        let base = points[i - lag].value;
        if base == 0.0 {
            continue;
        }
        let value = (points[i].value / base - 1.0) * factor;
        if value.is_finite() {
            out.push(DataPoint {
                date: points[i].date,
                value,
            });
        }
    }
    out
}
