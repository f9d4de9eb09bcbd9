//! Regularly spaced series with an integer annual frequency.

use crate::error::{Result, ValidationError, X11Error};
use chrono::{Datelike, Months, NaiveDate};

/// An immutable, regularly spaced series observed `period` times per year.
///
/// Besides the values, a series knows the within-cycle position of its first
/// observation (0 = first month/quarter of the year), so that tables which
/// were trimmed at the front stay aligned by period arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Vec<f64>,
    period: usize,
    start_position: usize,
    start_date: Option<NaiveDate>,
}

impl Series {
    /// Create a series from values, its annual frequency and the position of
    /// the first observation within the annual cycle.
    pub fn new(values: Vec<f64>, period: usize, start_position: usize) -> Result<Self> {
        if period == 0 {
            return Err(ValidationError::InvalidParameter("period must be positive".to_string()).into());
        }
        if start_position >= period {
            return Err(ValidationError::InvalidParameter(format!(
                "start position {} outside cycle of length {}",
                start_position, period
            ))
            .into());
        }
        Ok(Self {
            values,
            period,
            start_position,
            start_date: None,
        })
    }

    /// Create a monthly series starting in January.
    pub fn monthly(values: Vec<f64>) -> Self {
        Self {
            values,
            period: 12,
            start_position: 0,
            start_date: None,
        }
    }

    /// Create a series anchored at a calendar date.
    ///
    /// The period must divide 12; the start position is derived from the
    /// month of `start`.
    pub fn starting_at(start: NaiveDate, period: usize, values: Vec<f64>) -> Result<Self> {
        if period == 0 || 12 % period != 0 {
            return Err(ValidationError::UnsupportedPeriod(period).into());
        }
        let months_per_obs = 12 / period as u32;
        let position = (start.month0() / months_per_obs) as usize;
        let mut series = Self::new(values, period, position)?;
        series.start_date = Some(start);
        Ok(series)
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Annual frequency.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Within-cycle position of the first observation.
    pub fn start_position(&self) -> usize {
        self.start_position
    }

    /// Within-cycle position of observation `index`.
    pub fn position_of(&self, index: usize) -> usize {
        (self.start_position + index) % self.period
    }

    /// Number of complete annual cycles covered.
    pub fn full_cycles(&self) -> usize {
        self.values.len() / self.period
    }

    /// Calendar date of observation `index`, when the series is anchored.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        let start = self.start_date?;
        let step = 12 / self.period as u32;
        start.checked_add_months(Months::new(step * index as u32))
    }

    /// Series with the same frequency and alignment but different values.
    pub fn with_values(&self, values: Vec<f64>) -> Self {
        Self {
            values,
            period: self.period,
            start_position: self.start_position,
            start_date: self.start_date,
        }
    }

    /// Remove `front` observations at the start and `back` at the end.
    ///
    /// The start position (and date, if any) moves forward accordingly.
    pub fn drop(&self, front: usize, back: usize) -> Self {
        let n = self.values.len();
        let end = n.saturating_sub(back).max(front.min(n));
        let start = front.min(n);
        Self {
            values: self.values[start..end].to_vec(),
            period: self.period,
            start_position: (self.start_position + start) % self.period,
            start_date: self.shifted_date(start as i64),
        }
    }

    /// Series aligned `back` observations before this one with new values.
    pub(crate) fn extended_back(&self, back: usize, values: Vec<f64>) -> Self {
        let shift = back % self.period;
        Self {
            values,
            period: self.period,
            start_position: (self.start_position + self.period - shift) % self.period,
            start_date: self.shifted_date(-(back as i64)),
        }
    }

    /// Apply `f` to every observation.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        self.with_values(self.values.iter().map(|&x| f(x)).collect())
    }

    /// Combine two aligned series of equal length element-wise.
    pub fn zip_with<F>(&self, other: &Series, f: F) -> Result<Self>
    where
        F: Fn(f64, f64) -> f64,
    {
        if other.len() != self.len() {
            return Err(X11Error::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(self.with_values(
            self.values
                .iter()
                .zip(other.values.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        ))
    }

    /// Indices of the observations at a given within-cycle position.
    pub fn indices_at(&self, position: usize) -> impl Iterator<Item = usize> {
        let first = (position + self.period - self.start_position) % self.period;
        (first..self.values.len()).step_by(self.period)
    }

    fn shifted_date(&self, obs: i64) -> Option<NaiveDate> {
        let start = self.start_date?;
        let months = obs * (12 / self.period as i64);
        if months >= 0 {
            start.checked_add_months(Months::new(months as u32))
        } else {
            start.checked_sub_months(Months::new((-months) as u32))
        }
    }
}
