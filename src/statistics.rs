//! Descriptive statistics over series of consumption values.

use statrs::statistics::{Data, Distribution, Max, Min};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Descriptive {
    pub(crate) total: f64,
    pub(crate) mean: f64,
    pub(crate) max: f64,
    pub(crate) min: f64,
}

/// Total, mean, max and min of the given values, or None when there are none.
pub(crate) fn describe(values: &[f64]) -> Option<Descriptive> {
    if values.is_empty() {
        return None;
    }

    let data = Data::new(values.to_vec());

    Some(Descriptive {
        total: values.iter().sum(),
        mean: data.mean()?,
        max: data.max(),
        min: data.min(),
    })
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Data::new(values.to_vec()).mean()
}
