//! End-to-end runs of the acquisition pipeline on scripted sensor data

use std::io::Cursor;
use strum_capture::{
    AcquisitionLoop, CaptureBuffer, CaptureError, DataLogger, LearnDetectController, Phase, RawSample,
    ReplaySensor, SampleSource, ScriptedSensor, StatusKind, TemplateModel, TriggerConfig,
    TriggerDetector, WriterTransport,
};

const MINI: usize = 5;
const CAPTURE: usize = 16;

/// Readings around `level` where every axis changes on every step
fn steady(level: i32, n: usize) -> Vec<RawSample> {
    (0..n as i32)
        .map(|i| {
            let d = if i % 2 == 0 { 3 } else { -3 };
            RawSample::new(level + d, level - d, level + 2 * d)
        })
        .collect()
}

/// One quiet check (no trigger), then a strum and its capture
fn strum_event(capture_level: i32) -> Vec<RawSample> {
    let mut readings = steady(500, 2 * MINI);
    readings.extend(steady(200, MINI));
    readings.extend(steady(650, MINI));
    readings.extend(steady(capture_level, CAPTURE));
    readings
}

fn detector() -> TriggerDetector {
    TriggerDetector::new(TriggerConfig {
        mini: MINI,
        ..TriggerConfig::default()
    })
}

#[test]
fn test_logging_mode_writes_one_line_per_strum() {
    let mut readings = strum_event(900);
    readings.extend(strum_event(1100));
    let source = SampleSource::new(ScriptedSensor::new(readings), 1000.0);
    let logger = DataLogger::new(WriterTransport::new(Vec::new()));

    let mut acquisition = AcquisitionLoop::new(source, detector(), CaptureBuffer::new(CAPTURE), logger);
    assert!(matches!(acquisition.run(), Err(CaptureError::SourceExhausted)));

    assert_eq!(acquisition.stats().checks(), 4);
    assert_eq!(acquisition.stats().triggers(), 2);

    let (source, logger) = acquisition.into_parts();
    assert_eq!(source.accepted(), 2 * (4 * MINI + CAPTURE) as u64);

    let output = String::from_utf8(logger.into_transport().into_inner()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line.split_whitespace().count(), CAPTURE * 3);
    }
    assert!(lines[0].starts_with("0.903 0.897 0.906 "));
    assert!(lines[1].starts_with("1.103 1.097 1.106 "));
    assert!(output.ends_with(" \n"));
}

#[test]
fn test_learn_then_infer_flags_the_odd_strum() {
    let learning_target = 3;
    let mut readings = Vec::new();
    for _ in 0..learning_target {
        readings.extend(strum_event(900));
    }
    readings.extend(strum_event(900));
    readings.extend(strum_event(2900));

    let source = SampleSource::new(ScriptedSensor::new(readings), 1000.0);
    let controller = LearnDetectController::new(
        TemplateModel::new(),
        Vec::<String>::new(),
        Vec::<StatusKind>::new(),
        learning_target,
        90,
    )
    .unwrap();

    let mut acquisition =
        AcquisitionLoop::new(source, detector(), CaptureBuffer::new(CAPTURE), controller);
    assert!(matches!(acquisition.run(), Err(CaptureError::SourceExhausted)));

    let controller = acquisition.consumer();
    assert_eq!(controller.phase(), Phase::Inferring);
    assert_eq!(controller.learn_count(), 3);
    assert_eq!(controller.model().learned(), 3);

    let lines = controller.transport();
    assert_eq!(&lines[..3], &["33\n", "66\n", "100\n"]);
    assert_eq!(lines[3], "100\n");
    assert_eq!(lines[4], "0\n");

    assert_eq!(
        controller.indicator(),
        &vec![
            StatusKind::Learned,
            StatusKind::Learned,
            StatusKind::Learned,
            StatusKind::LearningComplete,
            StatusKind::Nominal,
            StatusKind::Anomaly,
        ]
    );
}

#[test]
fn test_replayed_recording_drives_the_loop() {
    let recording: String = strum_event(900)
        .iter()
        .map(|r| format!("{} {} {}\n", r.x, r.y, r.z))
        .collect();
    let recording = format!("# x y z (mg)\n{}", recording);

    let sensor = ReplaySensor::from_reader(Cursor::new(recording));
    let source = SampleSource::new(sensor, 1000.0);
    let logger = DataLogger::new(Vec::<String>::new());
    let mut acquisition = AcquisitionLoop::new(source, detector(), CaptureBuffer::new(CAPTURE), logger);

    assert!(matches!(acquisition.run(), Err(CaptureError::SourceExhausted)));
    assert_eq!(acquisition.consumer().buffers(), 1);
    assert_eq!(acquisition.source().sensor().readings(), (4 * MINI + CAPTURE) as u64);
}
