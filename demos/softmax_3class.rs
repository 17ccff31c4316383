use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use sgd_mlp::{ActivationFunction, MlpClassifier, NetworkBuilder, ObjectiveFunction, OnlineLearner};

fn main() -> sgd_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Tiny synthetic 3-class dataset in 2D: one uniform blob per class.
    let mut rng = StdRng::seed_from_u64(0);

    let centers = [[-1.0_f64, -1.0], [1.0, -1.0], [0.0, 1.0]];
    let n_per_class = 128;
    let mut samples = Vec::with_capacity(3 * n_per_class);

    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            let x0 = center[0] + rng.gen_range(-0.3..0.3);
            let x1 = center[1] + rng.gen_range(-0.3..0.3);
            samples.push(([x0, x1], class));
        }
    }

    let net = NetworkBuilder::new(2)?
        .objective(ObjectiveFunction::CrossEntropy)
        .add_layer(16, ActivationFunction::Rectifier)?
        .add_layer(3, ActivationFunction::Softmax)?
        .build_with_seed(0)?;
    let mut clf = MlpClassifier::new(net)?;
    clf.network_mut().set_learning_rate(0.05)?;
    clf.network_mut().set_weight_decay(0.001)?;

    for epoch in 0..20 {
        let loss = clf.learn_many(samples.iter().map(|(x, y)| (&x[..], *y)))?;
        if epoch % 5 == 0 {
            println!("epoch={epoch} loss={loss:.4}");
        }
    }

    let mut correct = 0;
    for (x, y) in &samples {
        if clf.predict(x)? == *y {
            correct += 1;
        }
    }
    println!("accuracy={:.3}", correct as f64 / samples.len() as f64);

    let mut post = [0.0; 3];
    let class = clf.posteriori(&[0.0, 1.0], &mut post)?;
    println!("posteriori([0, 1]) = {post:?} -> class {class}");

    Ok(())
}
