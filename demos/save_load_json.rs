use sgd_mlp::{ActivationFunction, Dataset, FitConfig, Network, NetworkBuilder, Shuffle};
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
    net.set_weight_decay(0.0)?;

    net.fit(
        &train,
        &FitConfig {
            epochs: 500,
            shuffle: Shuffle::Seeded(0),
        },
    )?;

    let path = std::env::temp_dir().join("sgd_mlp_xor.json");
    net.save_json(&path)?;

    let mut loaded = Network::load_json(&path)?;
    for x in &xs {
        let a = net.predict(x)?[0];
        let b = loaded.predict(x)?[0];
        println!("{x:?} -> saved {a:.4} loaded {b:.4}");
    }
    println!("saved and loaded network: {}", path.display());
    Ok(())
}
