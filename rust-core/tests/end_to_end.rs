//! Full pipeline runs on synthetic signals

use std::f64::consts::{PI, SQRT_2};

use signal_features::{
    apply_filter, envelope_spectrum, extract_features, segment, spectrum, stft, AnalysisConfig,
    Band, ErrorKind, FeatureKind, FeatureSelection, FilterSpec, SampleBuffer, SegmentationSpec,
    SignalTable,
};

fn sine(freq_hz: f64, amplitude: f64, fs: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / fs).sin())
        .collect()
}

fn magnitude_at(samples: &[f64], fs: f64, freq_hz: f64) -> f64 {
    let spec = spectrum(samples, fs).unwrap();
    let bin = (freq_hz * samples.len() as f64 / fs).round() as usize;
    spec.magnitudes[bin]
}

#[test]
fn rms_and_peak_to_peak_per_segment() {
    let amplitude = 1.5;
    let buffer = SampleBuffer::new(sine(10.0, amplitude, 100.0, 1000), 100.0).unwrap();
    let selection = FeatureSelection::from_names(&["RootMeanSquared", "PeakToPeak"]).unwrap();

    let table = extract_features(&buffer, &SegmentationSpec::new(1.0, 0.0), &selection).unwrap();

    assert_eq!(table.num_rows(), 10);
    assert_eq!(table.column_names(), ["RootMeanSquared", "PeakToPeak"]);
    for row in table.rows() {
        assert!((row[0] - amplitude / SQRT_2).abs() < 1e-9);
        // 10 samples per period never land exactly on the crest
        assert!((row[1] - 2.0 * amplitude).abs() < 0.1 * amplitude);
    }
}

#[test]
fn overlapping_segment_count() {
    let buffer = SampleBuffer::new(vec![0.0; 1000], 100.0).unwrap();
    let segments = segment(&buffer, &SegmentationSpec::new(1.0, 50.0)).unwrap();

    assert_eq!(segments.len(), (1000 - 100) / 50 + 1);
    assert!(segments.windows(2).all(|w| w[1].start() - w[0].start() == 50));
    assert!(segments.iter().all(|s| s.len() == 100));
}

#[test]
fn segment_longer_than_signal_gives_empty_table() {
    let buffer = SampleBuffer::new(vec![1.0; 50], 100.0).unwrap();
    let selection = FeatureSelection::from_names(&["Variance", "Skewness"]).unwrap();

    let table = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.num_columns(), 2);
}

#[test]
fn columns_follow_selection_order() {
    let buffer = SampleBuffer::new(sine(5.0, 1.0, 100.0, 400), 100.0).unwrap();
    let names = ["Kurtosis", "EnergyFFT", "Variance", "PeakValue"];
    let selection = FeatureSelection::from_names(&names).unwrap();

    let table = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap();
    assert_eq!(table.column_names(), names);
}

#[test]
fn crest_factor_of_sampled_crest_sine() {
    // 5 Hz at 100 Hz samples the crest exactly
    let buffer = SampleBuffer::new(sine(5.0, 3.0, 100.0, 200), 100.0).unwrap();
    let mut selection = FeatureSelection::new();
    selection.select(FeatureKind::CrestFactor).unwrap();

    let table = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap();
    for value in table.column("CrestFactor").unwrap() {
        assert!((value - SQRT_2).abs() < 1e-9);
    }
}

#[test]
fn crest_factor_of_silence_is_undefined() {
    let buffer = SampleBuffer::new(vec![0.0; 200], 100.0).unwrap();
    let mut selection = FeatureSelection::new();
    selection.select(FeatureKind::CrestFactor).unwrap();

    let err = extract_features(&buffer, &SegmentationSpec::default(), &selection).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ComputationError);
}

#[test]
fn lowpass_removes_high_tone() {
    let fs = 200.0;
    let n = 2000;
    let slow = sine(2.0, 1.0, fs, n);
    let fast = sine(30.0, 1.0, fs, n);
    let mixed: Vec<f64> = slow.iter().zip(&fast).map(|(a, b)| a + b).collect();

    let filtered = apply_filter(&mixed, fs, &FilterSpec::lowpass(10.0, 4)).unwrap();
    assert_eq!(filtered.len(), mixed.len());

    let before = magnitude_at(&mixed, fs, 30.0);
    let after = magnitude_at(&filtered, fs, 30.0);
    assert!(20.0 * (before / after).log10() >= 20.0);

    let kept = magnitude_at(&filtered, fs, 2.0) / magnitude_at(&mixed, fs, 2.0);
    assert!((kept - 1.0).abs() < 0.05);
}

#[test]
fn filter_cutoff_above_nyquist_rejected() {
    let x = sine(5.0, 1.0, 100.0, 500);
    let err = apply_filter(&x, 100.0, &FilterSpec::lowpass(60.0, 4)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[test]
fn envelope_of_steady_tone_is_mostly_dc() {
    let fs = 1000.0;
    let x = sine(100.0, 1.0, fs, 1000);

    let env = envelope_spectrum(&x, fs, Band::new(50.0, 150.0)).unwrap();
    assert_eq!(env.peak_frequency(), Some(0.0));
    let dc_share = env.magnitudes[0].powi(2) / env.energy();
    assert!(dc_share > 0.8, "{dc_share}");
    // the rectified tone repeats at 200 Hz
    assert!(env.magnitudes[200] > env.magnitudes[100] + 100.0);
}

#[test]
fn spectrogram_tracks_tone_switch() {
    let fs = 100.0;
    let mut x = sine(10.0, 1.0, fs, 500);
    x.extend(sine(30.0, 1.0, fs, 500));

    let grid = stft(&x, fs, 1.0, 0.5).unwrap();
    assert_eq!(grid.num_frames(), 20);
    assert_eq!(grid.num_bins(), 50);

    let dominant = |frame: usize| {
        let column = grid.frame(frame).unwrap();
        let (bin, _) = column
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
        grid.frequencies[bin]
    };
    assert!((dominant(4) - 10.0).abs() < 1e-9);
    assert!((dominant(15) - 30.0).abs() < 1e-9);
}

#[test]
fn configured_pipeline_over_a_table() {
    let config = AnalysisConfig::from_toml_str(
        r#"
sampling_rate_hz = 100.0
features = ["RootMeanSquared", { name = "ShannonEntropy", bins = 8 }]

[segmentation]
segment_seconds = 2.0
overlap_percent = 50.0

[filter]
kind = "high_pass"
cutoff_hz = 2.0
order = 2
"#,
    )
    .unwrap();

    let table = SignalTable::new(config.sampling_rate_hz)
        .unwrap()
        .with_column("a", sine(10.0, 1.0, 100.0, 1000))
        .unwrap()
        .with_column("b", sine(20.0, 2.0, 100.0, 1000))
        .unwrap();

    let filtered = table.filter_table(config.filter.as_ref().unwrap()).unwrap();
    assert_eq!(filtered.names(), ["a", "b"]);

    let features = table
        .feature_table("b", &config.segmentation, &config.feature_selection().unwrap())
        .unwrap();
    assert_eq!(features.num_rows(), 9);
    assert_eq!(features.column_names(), ["RootMeanSquared", "ShannonEntropy"]);
    assert!((features.values()[[0, 0]] - SQRT_2).abs() < 1e-9);
}
