use burn::config::Config;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{MaxPool2d, MaxPool2dConfig};
use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::{Backend, Tensor};
use burn::tensor::activation::softmax;

const KERNEL: usize = 3;
const FILTERS: [usize; 6] = [32, 64, 64, 64, 64, 64];

/// PlantVillage leaf CNN: six conv/pool stages and a two layer head.
/// Takes raw `0..=255` pixels in `[B, 3, H, W]` and returns class probabilities.
#[derive(Debug, Module)]
pub struct LeafClassifier<B: Backend> {
	activation: Relu,
	pool: MaxPool2d,
	convs: Vec<Conv2d<B>>,
	fc1: Linear<B>,
	fc2: Linear<B>,
}

impl <B: Backend> LeafClassifier<B> {
	pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
		let mut x = images / 255.0;

		for conv in &self.convs {
			x = conv.forward(x);
			x = self.activation.forward(x);
			x = self.pool.forward(x);
		}

		let x = x.flatten(1, 3);

		let x = self.fc1.forward(x);
		let x = self.activation.forward(x);
		let x = self.fc2.forward(x);

		softmax(x, 1)
	}

	/// Width of the output layer, as stored in the loaded weights.
	pub fn num_classes(&self) -> usize {
		self.fc2.weight.val().dims()[1]
	}
}

#[derive(Debug, Config)]
pub struct LeafClassifierConfig {
	#[config(default = 15)]
	pub num_classes: usize,
	#[config(default = 64)]
	hidden_size: usize,
	#[config(default = 256)]
	image_size: usize,
}

impl LeafClassifierConfig {
	pub fn init<B: Backend>(&self, device: &B::Device) -> LeafClassifier<B> {
		let mut channels = 3;
		let mut side = self.image_size;
		let mut convs = Vec::with_capacity(FILTERS.len());

		for filters in FILTERS {
			convs.push(Conv2dConfig::new([channels, filters], [KERNEL, KERNEL]).init(device));
			channels = filters;
			// valid 3x3 conv, then 2x2 pool
			side = (side - (KERNEL - 1)) / 2;
		}

		let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

		let fc1 = LinearConfig::new(channels * side * side, self.hidden_size).init(device);
		let fc2 = LinearConfig::new(self.hidden_size, self.num_classes).init(device);

		LeafClassifier {
			activation: Relu::new(),
			pool,
			convs,
			fc1,
			fc2,
		}
	}
}
