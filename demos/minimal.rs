use diwa::{NeuralNetwork, Topology};

fn main() {
    let inputs: [[f64; 2]; 4] = [[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
    let targets: [[f64; 1]; 4] = [[1.], [0.], [0.], [1.]];

    let mut nn = NeuralNetwork::new();
    if let Err(err) = nn.initialize(Topology::new(2, 1, 3, 1), true) {
        eprintln!("failed to initialize network: {err}");
        return;
    }

    for epoch in 0..=1500 {
        for (x_i, y_i) in inputs.iter().zip(&targets) {
            nn.train(6.0, x_i, y_i);
        }
        if epoch % 500 == 0 {
            let mut accuracy = 0.0;
            let mut loss = 0.0;
            for (x_i, y_i) in inputs.iter().zip(&targets) {
                accuracy += nn.calculate_accuracy(x_i, y_i, 3);
                loss += nn.calculate_loss(x_i, y_i, 3);
            }
            println!(
                "epoch {epoch}\t| accuracy {:.0}%\t| loss {:.0}%",
                accuracy / 4.0 * 100.0,
                loss / 4.0 * 100.0
            );
        }
    }

    for x_i in &inputs {
        let a = nn.inference(x_i)[0];
        println!("{x_i:?} => {} ({a:.6})", (a >= 0.5) as u8);
    }
}
