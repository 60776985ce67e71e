use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dense_mlp::{Activation, Dataset, FitConfig, NetworkBuilder, metrics};

/// Gaussian-ish blobs around `centers`, `per_class` points each.
fn blobs(centers: &[[f64; 2]], per_class: usize, spread: f64, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(centers.len() * per_class);
    let mut ids = Vec::with_capacity(centers.len() * per_class);
    for (class, c) in centers.iter().enumerate() {
        for _ in 0..per_class {
            rows.push(vec![
                c[0] + rng.gen_range(-spread..spread),
                c[1] + rng.gen_range(-spread..spread),
            ]);
            ids.push(class);
        }
    }
    Dataset::from_class_ids(&rows, &ids, centers.len()).unwrap()
}

#[test]
fn single_layer_learns_linearly_separable_classes() {
    let train = blobs(&[[-2.0, 0.0], [2.0, 0.0]], 50, 1.0, 0);
    let mut net = NetworkBuilder::from_sizes(&[2, 2], &[Activation::Softmax])
        .unwrap()
        .build_with_seed(0)
        .unwrap();

    let report = net
        .fit(
            &train,
            FitConfig {
                epochs: 20,
                batch_size: 10,
                learning_rate: 0.1,
                momentum: 0.9,
                weight_decay: 0.0,
                seed: 1,
            },
        )
        .unwrap();

    let first = report.epochs.first().unwrap();
    let last = report.last().unwrap();
    assert!(last.loss < first.loss, "loss did not drop: {first:?} -> {last:?}");

    let predictions = net.make_predictions(train.examples()).unwrap();
    let acc = metrics::accuracy(&predictions, train.labels()).unwrap();
    assert!(acc > 0.9, "accuracy={acc}");
}

#[test]
fn hidden_selu_layer_separates_three_blobs() {
    let train = blobs(&[[-2.0, -2.0], [2.0, -2.0], [0.0, 2.0]], 40, 0.5, 7);
    let mut net = NetworkBuilder::new(2)
        .unwrap()
        .add_layer(16, Activation::selu())
        .unwrap()
        .add_layer(3, Activation::Softmax)
        .unwrap()
        .build_with_seed(3)
        .unwrap();

    net.fit(
        &train,
        FitConfig {
            epochs: 30,
            batch_size: 16,
            learning_rate: 0.05,
            momentum: 0.9,
            weight_decay: 0.0001,
            seed: 5,
        },
    )
    .unwrap();

    let eval = net.evaluate(&train).unwrap();
    assert!(eval.accuracy > 0.9, "{eval:?}");
}

#[test]
fn weight_decay_alone_shrinks_every_weight() {
    let train = blobs(&[[-1.0, 0.0], [1.0, 0.0]], 3, 0.2, 11);
    let mut net = NetworkBuilder::from_sizes(&[2, 4, 2], &[Activation::selu(), Activation::Softmax])
        .unwrap()
        .build_with_seed(2)
        .unwrap();
    let before: Vec<_> = net.layers().iter().map(|l| l.weights().clone()).collect();

    // 6 examples, batch size 4: one full and one short batch, so two decay steps.
    net.fit(
        &train,
        FitConfig {
            epochs: 1,
            batch_size: 4,
            learning_rate: 0.0,
            momentum: 0.0,
            weight_decay: 0.1,
            seed: 0,
        },
    )
    .unwrap();

    for (layer, old) in net.layers().iter().zip(&before) {
        for (&w, &w0) in layer.weights().iter().zip(old.iter()) {
            assert!(w.abs() < w0.abs() || w0 == 0.0, "{w0} -> {w}");
            let expected = w0 * 0.9 * 0.9;
            assert!((w - expected).abs() <= 1e-12 * w0.abs().max(1.0));
        }
    }
}

#[test]
fn training_is_reproducible_for_a_fixed_seed() {
    let train = blobs(&[[-1.0, 1.0], [1.0, -1.0]], 10, 0.5, 4);
    let cfg = FitConfig {
        epochs: 3,
        batch_size: 3,
        seed: 9,
        ..FitConfig::default()
    };

    let run = || {
        let mut net =
            NetworkBuilder::from_sizes(&[2, 5, 2], &[Activation::selu(), Activation::Softmax])
                .unwrap()
                .build_with_seed(8)
                .unwrap();
        let report = net.fit(&train, cfg).unwrap();
        (report, net.layer(0).unwrap().weights().clone())
    };

    assert_eq!(run(), run());
}
