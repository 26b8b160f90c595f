/// Basic usage example: feed gyroscope samples, get gesture events
use twist_sensing::{EngineEvent, GesturePipeline, PipelineConfig, SensorCaps, SensorSample};

fn main() {
    println!("=== Wrist-Twist Engine: Basic Example ===\n");

    // Create a pipeline for a device without a dedicated wear sensor.
    let mut pipeline = GesturePipeline::new(PipelineConfig::default(), SensorCaps::gyro_only())
        .expect("this example assumes a gyroscope");

    // Simulate the stream: ambient jitter while the noise floor settles,
    // then a deliberate triple twist on the x axis.
    let samples = vec![
        // Ambient wrist jitter (sub-threshold)
        SensorSample::gyro(1000, [0.32, 0.11, 0.08]),
        SensorSample::gyro(1020, [0.28, 0.14, 0.10]),
        SensorSample::gyro(1040, [0.35, 0.09, 0.12]),
        SensorSample::gyro(1060, [0.30, 0.12, 0.07]),
        SensorSample::gyro(1080, [0.27, 0.10, 0.09]),
        // Twist out...
        SensorSample::gyro(2000, [8.7, 0.5, 0.4]),
        // ...twist back...
        SensorSample::gyro(2320, [-9.1, 0.4, 0.6]),
        // ...twist out again.
        SensorSample::gyro(2640, [8.9, 0.6, 0.3]),
        // Settling
        SensorSample::gyro(2700, [0.4, 0.2, 0.1]),
        SensorSample::gyro(2720, [0.3, 0.1, 0.1]),
    ];

    println!("Processing {} samples...\n", samples.len());

    for sample in &samples {
        if let Some(event) = pipeline.process_sample(sample) {
            match event {
                EngineEvent::GestureCompleted { direction } => {
                    println!(
                        "t={}ms: triple twist recognized, start direction {:+}",
                        sample.timestamp_ms,
                        direction.sign()
                    );
                }
                EngineEvent::WearStateChanged { worn } => {
                    println!("t={}ms: wear state changed, worn={worn}", sample.timestamp_ms);
                }
            }
        }
    }

    println!("\n=== Summary ===");
    println!("Gestures recognized: {}", pipeline.gestures_emitted());
    println!("Noise floor: {:.2} rad/s", pipeline.noise_floor());
}
