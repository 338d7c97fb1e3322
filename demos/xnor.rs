use std::path::PathBuf;

use clap::Parser;
use diwa::{Gym, NeuralNetwork, Topology};
use rand::{SeedableRng, rngs::StdRng};

/// Trains an XNOR gate, saves it, and loads it back.
#[derive(Parser, Debug)]
struct Args {
    /// Passes over the four samples.
    #[arg(long, default_value_t = 5000)]
    epochs: usize,
    #[arg(long, default_value_t = 6.0)]
    learning_rate: f64,
    /// Where the trained model is written.
    #[arg(long, default_value = "model.ann")]
    model: PathBuf,
    /// Seed for weight initialization, random if not given.
    #[arg(long)]
    seed: Option<u64>,
}

fn print_results(nn: &mut NeuralNetwork, samples: &[(&[f64], &[f64])]) {
    for (x_i, y_i) in samples {
        let a = nn.inference(x_i)[0];
        println!(
            "[{:.1}, {:.1}] => {} ({a:.6}), expected {}",
            x_i[0],
            x_i[1],
            (a >= 0.5) as u8,
            y_i[0]
        );
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let samples: &[(&[f64], &[f64])] = &[
        (&[0., 0.], &[1.]),
        (&[0., 1.], &[0.]),
        (&[1., 0.], &[0.]),
        (&[1., 1.], &[1.]),
    ];

    let topology = Topology::new(2, 1, 3, 1);
    let mut nn = match args.seed {
        Some(seed) => NeuralNetwork::with_topology(topology, &mut StdRng::seed_from_u64(seed)),
        None => NeuralNetwork::with_topology(topology, &mut rand::rng()),
    }
    .expect("failed to initialize network");

    println!("Training:");
    let evaluation = Gym::new(&mut nn, args.learning_rate).fit(samples, args.epochs, 10);
    println!(
        "accuracy = {:.2}%, loss = {:.2}%",
        evaluation.accuracy * 100.0,
        evaluation.loss * 100.0
    );
    print_results(&mut nn, samples);

    for i_layer in 0..nn.topology().n_layers() {
        println!(
            "=== Layer #{i_layer} ===\n\n{}\n",
            nn.pretty_print_layer(i_layer).unwrap()
        );
    }

    nn.save_to_path(&args.model).expect("failed to save model");
    println!("Saved model to {:?}", args.model);

    let mut loaded = NeuralNetwork::new();
    loaded
        .load_from_path(&args.model)
        .expect("failed to load model");
    println!("Loaded model from {:?}:", args.model);
    print_results(&mut loaded, samples);
}
