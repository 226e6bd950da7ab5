//! Integration tests for the full extraction path
//!
//! These tests validate the library end to end: a synthesized tone is
//! written as a WAV container, read back, framed, extracted, and persisted
//! through the feature container, exercising the same path the CLI drives.

use std::thread;

use fextor::config::ExtractorConfig;
use fextor::dsp::FeatureExtractor;
use fextor::feature::FeatureSet;
use fextor::wave::{self, gain, WaveSpec};

/// One second of a 1 kHz tone at 16 kHz, half scale.
fn tone_samples() -> Vec<f32> {
    (0..16000)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 16000.0).sin())
        .collect()
}

#[test]
fn test_wav_to_feature_file() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("tone.wav");
    let feat_path = dir.path().join("tone.feat");
    let spec = WaveSpec::mono_16k();

    wave::write_samples(&wav_path, &spec, &tone_samples()).unwrap();
    let mut samples: Vec<f32> = wave::read_samples(&wav_path, &spec).unwrap();
    gain::normalize_db(&mut samples, -25.0).unwrap();
    assert!((gain::decibel(&samples) + 25.0).abs() < 1e-3);

    let config = ExtractorConfig::for_sample_rate(16000).unwrap();
    let mut extractor = FeatureExtractor::<f32>::new();
    extractor.init(&config).unwrap();

    let hop = 160;
    let window = extractor.window_size();
    let num_frames = (samples.len() - window) / hop;
    assert!(num_frames > 90);

    let mut features = FeatureSet::new(num_frames as u32, extractor.num_mfcc() as u32);
    for n in 0..num_frames {
        let frame = &samples[n * hop..n * hop + window];
        let dest = features.frame_mut(n as u32).unwrap();
        extractor.mfcc(frame, dest).unwrap();
    }
    features.save(&feat_path).unwrap();

    let restored = FeatureSet::load(&feat_path).unwrap();
    assert_eq!(restored, features);
    assert_eq!(restored.feature_dim(), 40);
    assert!(restored
        .frame(0)
        .unwrap()
        .iter()
        .all(|v| v.is_finite()));
}

#[test]
fn test_steady_tone_yields_stable_mel_peak() {
    let samples = tone_samples();
    let config = ExtractorConfig::default();
    let mut extractor = FeatureExtractor::<f32>::new();
    extractor.init(&config).unwrap();

    let hop = 160;
    let window = extractor.window_size();
    let mut peaks = Vec::new();
    for n in 0..20 {
        let frame = &samples[n * hop..n * hop + window];
        let mut dest = vec![0.0; extractor.num_mels()];
        extractor.melspectrum(frame, &mut dest, false).unwrap();
        let peak = dest
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        peaks.push(peak);
    }

    // A steady tone should excite the same band in every frame.
    assert!(peaks.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_concurrent_extraction_with_shared_extractor() {
    let samples = tone_samples();
    let mut extractor = FeatureExtractor::<f32>::new();
    extractor.init(&ExtractorConfig::default()).unwrap();
    let window = extractor.window_size();

    let mut baseline = vec![0.0; extractor.num_mfcc()];
    extractor.mfcc(&samples[..window], &mut baseline).unwrap();

    let extractor = &extractor;
    let results: Vec<Vec<f32>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut scratch = extractor.allocate_scratch().unwrap();
                    let mut dest = vec![0.0; extractor.num_mfcc()];
                    extractor
                        .mfcc_with_scratch(&samples[..window], &mut dest, &mut scratch)
                        .unwrap();
                    dest
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert_eq!(result, baseline);
    }
}
