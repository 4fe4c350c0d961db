//! Checks the sample trading model shipped in `models/`

use signalserve_core::PredictionRequest;
use signalserve_model::load_model;
use std::path::PathBuf;

fn models_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../models")
}

#[test]
fn test_sample_model_signals() {
    let dir = models_dir();
    let model = load_model(dir.join("model_info.json"), dir.join("modelo_trading.json"))
        .expect("sample model should load");
    let service = model.service();

    let cases = [
        (vec![30.0, -0.5, 1000.0], "BUY", "green"),
        (vec![80.0, 0.5, 100.0], "SELL", "red"),
        (vec![50.0, 0.1, 300.0], "HOLD", "gray"),
    ];

    for (features, label, color) in cases {
        let result = service.predict(&PredictionRequest::new(features)).unwrap();
        assert_eq!(result.predicted_label, label);
        assert_eq!(result.color, color);

        let probabilities = result.probabilities.expect("tree ensembles report probabilities");
        assert!((probabilities.total() - 100.0).abs() <= 0.1);
        let labels: Vec<&str> = probabilities.labels().collect();
        assert_eq!(labels, vec!["SELL", "HOLD", "BUY"]);
    }
}
