//! Named multi-column signals processed column by column
//!
//! Columns never interact; each operation maps one column to one output
//! column and the columns run in parallel.

use ndarray::Array2;
use rayon::prelude::*;

use crate::buffer::{SampleBuffer, SegmentationSpec};
use crate::error::{Result, SignalError};
use crate::features::{extract_features, rms_series, FeatureResult, FeatureSelection};
use crate::filters::{apply_filter, FilterSpec};
use crate::spectrum::{spectrum, spectrum_range};

/// Equal-length named columns sharing one sampling rate
#[derive(Debug, Clone, PartialEq)]
pub struct SignalTable {
    sampling_rate_hz: f64,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl SignalTable {
    pub fn new(sampling_rate_hz: f64) -> Result<Self> {
        if !sampling_rate_hz.is_finite() || sampling_rate_hz <= 0.0 {
            return Err(SignalError::invalid(format!(
                "sampling rate must be positive, got {sampling_rate_hz}"
            )));
        }
        Ok(Self {
            sampling_rate_hz,
            names: Vec::new(),
            columns: Vec::new(),
        })
    }

    /// Build from a `[sample, column]` array
    pub fn from_array(names: &[&str], data: &Array2<f64>, sampling_rate_hz: f64) -> Result<Self> {
        if names.len() != data.ncols() {
            return Err(SignalError::invalid(format!(
                "{} names given for {} columns",
                names.len(),
                data.ncols()
            )));
        }
        let mut table = Self::new(sampling_rate_hz)?;
        for (name, column) in names.iter().zip(data.columns()) {
            table.add_column(name, column.to_vec())?;
        }
        Ok(table)
    }

    /// Append a column
    ///
    /// # Errors
    /// `InvalidParameter` for an empty or repeated name, no samples, or a
    /// length differing from the existing columns
    pub fn add_column(&mut self, name: &str, samples: Vec<f64>) -> Result<()> {
        if name.is_empty() {
            return Err(SignalError::invalid("column name must not be empty"));
        }
        if self.names.iter().any(|n| n == name) {
            return Err(SignalError::invalid(format!("duplicate column name {name:?}")));
        }
        if samples.is_empty() {
            return Err(SignalError::invalid(format!("column {name:?} has no samples")));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != samples.len() {
                return Err(SignalError::invalid(format!(
                    "column {name:?} has {} samples, expected {}",
                    samples.len(),
                    first.len()
                )));
            }
        }
        self.names.push(name.to_string());
        self.columns.push(samples);
        Ok(())
    }

    pub fn with_column(mut self, name: &str, samples: Vec<f64>) -> Result<Self> {
        self.add_column(name, samples)?;
        Ok(self)
    }

    pub fn sampling_rate_hz(&self) -> f64 {
        self.sampling_rate_hz
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_samples(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// One column as a [`SampleBuffer`]
    pub fn buffer(&self, name: &str) -> Result<SampleBuffer> {
        let samples = self
            .column(name)
            .ok_or_else(|| SignalError::invalid(format!("no column named {name:?}")))?;
        SampleBuffer::from_slice(samples, self.sampling_rate_hz)
    }

    fn map_columns<F>(&self, prefix: &str, f: F) -> Result<Vec<(String, Vec<f64>)>>
    where
        F: Fn(&[f64]) -> Result<Vec<f64>> + Sync,
    {
        self.names
            .par_iter()
            .zip(self.columns.par_iter())
            .map(|(name, column)| -> Result<(String, Vec<f64>)> {
                Ok((format!("{prefix}{name}"), f(column)?))
            })
            .collect()
    }

    /// Half-spectrum of every column, columns `FFT_<name>`
    pub fn spectrum_table(&self) -> Result<ResultTable> {
        let fs = self.sampling_rate_hz;
        let columns = self.map_columns("FFT_", |x| Ok(spectrum(x, fs)?.magnitudes))?;
        let n = self.num_samples();
        let index = (0..n / 2).map(|k| k as f64 * fs / n as f64).collect();
        ResultTable::new(Some(("frequency_hz".into(), index)), columns)
    }

    /// Half-spectrum of a time range of every column
    pub fn spectrum_range_table(&self, start_seconds: f64, end_seconds: f64) -> Result<ResultTable> {
        let fs = self.sampling_rate_hz;
        let spectra = self.map_columns("FFT_", |x| {
            Ok(spectrum_range(x, fs, start_seconds, end_seconds)?.magnitudes)
        })?;
        let index = match self.columns.first() {
            Some(first) => Some((
                "frequency_hz".to_string(),
                spectrum_range(first, fs, start_seconds, end_seconds)?.frequencies,
            )),
            None => None,
        };
        ResultTable::new(index, spectra)
    }

    /// RMS series of every column, columns `RMS_<name>`
    pub fn rms_table(&self, segmentation: &SegmentationSpec) -> Result<ResultTable> {
        let fs = self.sampling_rate_hz;
        let columns = self.map_columns("RMS_", |x| {
            rms_series(&SampleBuffer::from_slice(x, fs)?, segmentation)
        })?;

        let (_, step) = segmentation.sample_counts(fs)?;
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        let index = (0..rows).map(|i| (i * step) as f64 / fs).collect();
        ResultTable::new(Some(("time_s".into(), index)), columns)
    }

    /// Zero-phase filter every column, keeping the names
    pub fn filter_table(&self, spec: &FilterSpec) -> Result<ResultTable> {
        spec.validate(self.sampling_rate_hz)?;
        let fs = self.sampling_rate_hz;
        let columns = self.map_columns("", |x| apply_filter(x, fs, spec))?;
        ResultTable::new(None, columns)
    }

    /// Feature table for one column
    pub fn feature_table(
        &self,
        column: &str,
        segmentation: &SegmentationSpec,
        selection: &FeatureSelection,
    ) -> Result<FeatureResult> {
        extract_features(&self.buffer(column)?, segmentation, selection)
    }
}

/// Named output columns, optionally with an index column
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    index: Option<(String, Vec<f64>)>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl ResultTable {
    fn new(index: Option<(String, Vec<f64>)>, named: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let (names, columns): (Vec<String>, Vec<Vec<f64>>) = named.into_iter().unzip();
        let rows = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != rows) {
            return Err(SignalError::computation("result columns differ in length"));
        }
        Ok(Self {
            index,
            names,
            columns,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name and values of the index column (frequency or time axis)
    pub fn index(&self) -> Option<(&str, &[f64])> {
        self.index
            .as_ref()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Values as a `[row, column]` array, excluding the index
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let rows = self.num_rows();
        let cols = self.columns.len();
        Ok(Array2::from_shape_vec((cols, rows), self.columns.concat())?.reversed_axes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::f64::consts::PI;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    fn two_channel() -> SignalTable {
        SignalTable::new(100.0)
            .unwrap()
            .with_column("x", sine(5.0, 100.0, 400))
            .unwrap()
            .with_column("y", sine(20.0, 100.0, 400).iter().map(|v| 3.0 * v).collect())
            .unwrap()
    }

    #[test]
    fn test_column_rules() {
        let mut table = two_channel();
        let kind = |r: Result<()>| r.unwrap_err().kind();
        assert_eq!(kind(table.add_column("x", vec![0.0; 400])), ErrorKind::InvalidParameter);
        assert_eq!(kind(table.add_column("", vec![0.0; 400])), ErrorKind::InvalidParameter);
        assert_eq!(kind(table.add_column("z", vec![0.0; 10])), ErrorKind::InvalidParameter);
        assert_eq!(kind(table.add_column("z", Vec::new())), ErrorKind::InvalidParameter);
        assert_eq!(table.num_columns(), 2);
        assert!(SignalTable::new(0.0).is_err());
    }

    #[test]
    fn test_spectrum_table_names_and_peaks() {
        let result = two_channel().spectrum_table().unwrap();
        assert_eq!(result.names(), ["FFT_x", "FFT_y"]);
        assert_eq!(result.num_rows(), 200);

        let (index_name, freqs) = result.index().unwrap();
        assert_eq!(index_name, "frequency_hz");
        assert!((freqs[20] - 5.0).abs() < 1e-12);
        assert!((result.column("FFT_x").unwrap()[20] - 200.0).abs() < 1e-6);
        assert!((result.column("FFT_y").unwrap()[80] - 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_rms_table() {
        let result = two_channel().rms_table(&SegmentationSpec::new(1.0, 0.0)).unwrap();
        assert_eq!(result.names(), ["RMS_x", "RMS_y"]);
        assert_eq!(result.num_rows(), 4);
        for v in result.column("RMS_y").unwrap() {
            assert!((v - 3.0 / 2f64.sqrt()).abs() < 1e-9);
        }
        assert_eq!(result.index().unwrap().1, &[0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_rms_table_rows_in_time_order() {
        let ramp: Vec<f64> = (0..20_000).map(|i| i as f64).collect();
        let falling: Vec<f64> = ramp.iter().rev().copied().collect();
        let table = SignalTable::new(50.0)
            .unwrap()
            .with_column("up", ramp.clone())
            .unwrap()
            .with_column("down", falling.clone())
            .unwrap();

        // 25 samples per segment, step 25
        let result = table.rms_table(&SegmentationSpec::new(0.5, 0.0)).unwrap();
        assert_eq!(result.num_rows(), 800);

        let rms = |x: &[f64]| (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt();
        let up = result.column("RMS_up").unwrap();
        let down = result.column("RMS_down").unwrap();
        let (_, times) = result.index().unwrap();
        for i in 0..800 {
            assert_eq!(up[i], rms(&ramp[i * 25..i * 25 + 25]), "row {i}");
            assert_eq!(down[i], rms(&falling[i * 25..i * 25 + 25]), "row {i}");
            assert!((times[i] - i as f64 * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_filter_table_keeps_names() {
        let table = two_channel();
        let result = table.filter_table(&FilterSpec::lowpass(10.0, 4)).unwrap();
        assert_eq!(result.names(), ["x", "y"]);
        assert!(result.index().is_none());

        // 20 Hz channel is in the stopband
        let y = result.column("y").unwrap();
        let peak = y[100..300].iter().fold(0.0f64, |a, v| a.max(v.abs()));
        assert!(peak < 0.05, "{peak}");

        assert!(table.filter_table(&FilterSpec::lowpass(80.0, 4)).is_err());
    }

    #[test]
    fn test_feature_table_for_column() {
        let table = two_channel();
        let selection = FeatureSelection::from_names(&["RootMeanSquared"]).unwrap();
        let result = table
            .feature_table("y", &SegmentationSpec::default(), &selection)
            .unwrap();
        assert_eq!(result.num_rows(), 4);
        assert!(result
            .values()
            .iter()
            .all(|v| (v - 3.0 / 2f64.sqrt()).abs() < 1e-9));

        assert!(table
            .feature_table("missing", &SegmentationSpec::default(), &selection)
            .is_err());
    }

    #[test]
    fn test_spectrum_range_table() {
        let result = two_channel().spectrum_range_table(1.0, 3.0).unwrap();
        assert_eq!(result.num_rows(), 100);
        let (_, freqs) = result.index().unwrap();
        assert!((freqs[1] - 0.5).abs() < 1e-12);
        // 5 Hz at 0.5 Hz spacing
        assert!((result.column("FFT_x").unwrap()[10] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_to_array_layout() {
        let table = SignalTable::new(10.0)
            .unwrap()
            .with_column("a", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_column("b", vec![5.0, 6.0, 7.0, 8.0])
            .unwrap();
        let result = table.filter_table(&FilterSpec::lowpass(4.9, 1)).unwrap();
        let array = result.to_array().unwrap();
        assert_eq!(array.dim(), (4, 2));
        assert_eq!(array[[0, 1]], result.column("b").unwrap()[0]);
    }
}
