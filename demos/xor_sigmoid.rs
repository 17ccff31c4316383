use sgd_mlp::{ActivationFunction, Dataset, FitConfig, NetworkBuilder, Shuffle};
use tracing_subscriber::EnvFilter;

fn main() -> sgd_mlp::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    let mut net = NetworkBuilder::new(2)?
        .add_layer(8, ActivationFunction::Tanh)?
        .add_layer(1, ActivationFunction::LogisticSigmoid)?
        .build_with_seed(0)?;
    net.set_learning_rate(0.5)?;
    net.set_momentum(0.5)?;
    net.set_weight_decay(0.0)?;

    let report = net.fit(
        &train,
        &FitConfig {
            epochs: 5000,
            shuffle: Shuffle::Seeded(0),
        },
    )?;
    println!("final_loss={}", report.final_loss);

    for x in &xs {
        let y = net.predict(x)?[0];
        println!("{x:?} -> {y:.4}");
    }
    Ok(())
}
