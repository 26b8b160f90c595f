/// Wear gating example: how the engine suspends itself off the wrist
use twist_sensing::{GesturePipeline, PipelineConfig, SensorCaps, SensorSample};

fn main() {
    println!("=== Wrist-Twist Engine: Wear Gating Example ===\n");

    let mut pipeline = GesturePipeline::new(PipelineConfig::default(), SensorCaps::gyro_only())
        .expect("this example assumes a gyroscope");

    println!(
        "Wear strategy: {:?} (accelerometer feed needed: {})\n",
        pipeline.wear_strategy(),
        pipeline.needs_accelerometer_feed()
    );

    // The watch sits on a nightstand: one last wrist movement, then
    // thirty-five seconds of stillness sampled once a second.
    let mut samples = vec![SensorSample::accel(0, [0.7, 0.3, 0.1])];
    for i in 1..=35 {
        samples.push(SensorSample::accel(i * 1000, [0.02, 0.01, 0.01]));
    }

    for sample in &samples {
        if let Some(event) = pipeline.process_sample(sample) {
            println!("t={}ms: {:?}", sample.timestamp_ms, event);
        }
    }

    println!(
        "\nAfter stillness: worn={}, gesture sensors wanted={}",
        pipeline.is_worn(),
        pipeline.wants_gesture_sensors()
    );

    // A twist performed while the watch is off the wrist is ignored.
    for (ts, axes) in [
        (40_000, [9.0, 0.4, 0.4]),
        (40_300, [-9.0, 0.4, 0.4]),
        (40_600, [9.0, 0.4, 0.4]),
    ] {
        assert!(pipeline.process_sample(&SensorSample::gyro(ts, axes)).is_none());
    }
    println!("Triple twist while off-wrist: ignored (gestures={})", pipeline.gestures_emitted());

    // Picking the watch back up restores the gesture path immediately.
    if let Some(event) = pipeline.process_sample(&SensorSample::accel(45_000, [0.8, 0.2, 0.2])) {
        println!("t=45000ms: {event:?}");
    }
    println!(
        "Back on wrist: worn={}, gesture sensors wanted={}",
        pipeline.is_worn(),
        pipeline.wants_gesture_sensors()
    );
}
