use std::fs;

use dense_mlp::{Activation, Dataset, Error, FitConfig, NetworkBuilder, io};

#[test]
fn load_train_predict_and_write_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let vectors = dir.path().join("vectors.csv");
    let labels = dir.path().join("labels.csv");
    let out = dir.path().join("predictions");

    fs::write(&vectors, "0,0,255,255\n255,255,0,0\n0,10,250,255\n250,240,5,0\n").unwrap();
    fs::write(&labels, "1\n0\n1\n0\n").unwrap();

    let examples = io::load_examples(&vectors).unwrap();
    let labels = io::load_labels(&labels, 2).unwrap();
    assert_eq!(examples.len(), 4);
    assert!(examples.iter().all(|e| e.shape() == (1, 4)));

    let train = Dataset::new(examples, labels).unwrap();
    let mut net = NetworkBuilder::from_sizes(&[4, 3, 2], &[Activation::selu(), Activation::Softmax])
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    net.fit(
        &train,
        FitConfig {
            epochs: 100,
            batch_size: 2,
            learning_rate: 0.05,
            ..FitConfig::default()
        },
    )
    .unwrap();

    let predictions = net.make_predictions(train.examples()).unwrap();
    io::write_predictions(&out, &predictions).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let parsed: Vec<usize> = written.lines().map(|l| l.parse().unwrap()).collect();
    assert_eq!(parsed, predictions);
    assert_eq!(parsed, vec![1, 0, 1, 0]);
}

#[test]
fn malformed_files_surface_distinct_errors() {
    let dir = tempfile::tempdir().unwrap();
    let vectors = dir.path().join("bad.csv");
    fs::write(&vectors, "1,2,3\n4,five,6\n").unwrap();

    match io::load_examples(&vectors) {
        Err(Error::Parse { line, token, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(token, "five");
        }
        other => panic!("expected parse error, got {other:?}"),
    }

    assert!(matches!(
        io::load_labels(dir.path().join("missing"), 10),
        Err(Error::Io { .. })
    ));
}
