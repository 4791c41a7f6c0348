use burn::{
    nn::{loss::CrossEntropyLossConfig, Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TabularNetConfig {
    pub n_features: usize,
    pub n_classes:  usize,
    #[config(default = 64)]
    pub hidden:     usize,
    #[config(default = 0.1)]
    pub dropout:    f64,
}

impl TabularNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TabularNet<B> {
        TabularNet {
            gate:    LinearConfig::new(self.n_features, self.n_features).init(device),
            hidden1: LinearConfig::new(self.n_features, self.hidden).init(device),
            hidden2: LinearConfig::new(self.hidden, self.hidden).init(device),
            head:    LinearConfig::new(self.hidden, self.n_classes).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct TabularNet<B: Backend> {
    pub gate:    Linear<B>,
    pub hidden1: Linear<B>,
    pub hidden2: Linear<B>,
    pub head:    Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> TabularNet<B> {
    /// features: [batch, n_features] → logits: [batch, n_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        // Per-sample soft mask over the input columns, values in (0, 1)
        let mask = activation::sigmoid(self.gate.forward(features.clone()));
        let x    = features * mask;

        let x = self.dropout.forward(activation::relu(self.hidden1.forward(x)));
        let x = self.dropout.forward(activation::relu(self.hidden2.forward(x)));
        self.head.forward(x)
    }

    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(features);
        let loss   = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model: TabularNet<NdArray> = TabularNetConfig::new(5, 2).with_hidden(8).init(&device);
        let x = Tensor::<NdArray, 2>::zeros([3, 5], &device);
        assert_eq!(model.forward(x).dims(), [3, 2]);
    }
}
