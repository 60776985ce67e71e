use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dense_mlp::{Activation, Dataset, FitConfig, NetworkBuilder};

fn main() -> dense_mlp::Result<()> {
    // Three noisy 2D blobs, one per class.
    let mut rng = StdRng::seed_from_u64(0);

    let centers = [[-1.0_f64, -1.0], [1.0, -1.0], [0.0, 1.0]];
    let n_per_class = 128;
    let mut xs = Vec::with_capacity(3 * n_per_class);
    let mut ids = Vec::with_capacity(3 * n_per_class);

    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            let x0 = center[0] + rng.gen_range(-0.3..0.3);
            let x1 = center[1] + rng.gen_range(-0.3..0.3);
            xs.push(vec![x0, x1]);
            ids.push(class);
        }
    }

    let train = Dataset::from_class_ids(&xs, &ids, centers.len())?;

    let mut net = NetworkBuilder::new(2)?
        .add_layer(16, Activation::selu())?
        .add_layer(3, Activation::Softmax)?
        .build_with_seed(0)?;

    let report = net.fit(
        &train,
        FitConfig {
            epochs: 50,
            batch_size: 32,
            learning_rate: 0.05,
            momentum: 0.9,
            weight_decay: 0.0002,
            seed: 0,
        },
    )?;

    if let Some(last) = report.last() {
        println!("epoch={} loss={} accuracy={}", last.epoch, last.loss, last.accuracy);
    }

    let eval = net.evaluate(&train)?;
    println!("evaluate: loss={} accuracy={}", eval.loss, eval.accuracy);

    Ok(())
}
