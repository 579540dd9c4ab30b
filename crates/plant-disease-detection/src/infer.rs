use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{CompactRecorder, Recorder};
use burn::tensor::{Tensor, TensorData};
use once_cell::sync::OnceCell;

use crate::data::{ClassRegistry, LeafImage};
use crate::error::PlantDiseaseError;
use crate::model::{LeafClassifier, LeafClassifierConfig};

/// Anything that turns one leaf image into a probability per class.
pub trait Classifier: Send + Sync {
	fn predict(&self, image: &LeafImage) -> Result<Vec<f32>, PlantDiseaseError>;

	fn num_classes(&self) -> usize;
}

pub struct BurnClassifier<B: Backend> {
	model: Mutex<LeafClassifier<B>>,
	num_classes: usize,
	device: B::Device,
}

impl <B: Backend> BurnClassifier<B> {
	pub fn new(model: LeafClassifier<B>, device: B::Device) -> Self {
		Self {
			num_classes: model.num_classes(),
			model: Mutex::new(model),
			device,
		}
	}
}

impl <B: Backend> Classifier for BurnClassifier<B> {
	fn predict(&self, image: &LeafImage) -> Result<Vec<f32>, PlantDiseaseError> {
		let data = TensorData::new(image.pixels.clone(), LeafImage::SHAPE).convert::<B::FloatElem>();
		let images = Tensor::<B, 4>::from_data(data, &self.device).permute([0, 3, 1, 2]); // [1, 3, 256, 256]

		let model = self
			.model
			.lock()
			.map_err(|_| PlantDiseaseError::Inference("model lock poisoned".to_string()))?;
		let output = model.forward(images);

		output
			.into_data()
			.convert::<f32>()
			.to_vec::<f32>()
			.map_err(|err| PlantDiseaseError::Inference(format!("{err:?}")))
	}

	fn num_classes(&self) -> usize {
		self.num_classes
	}
}

/// Loads the model artifact once and hands out the same instance afterwards.
/// A failed load is not cached.
pub struct ModelLoader<B: Backend> {
	artifact: PathBuf,
	device: B::Device,
	model: OnceCell<Arc<BurnClassifier<B>>>,
}

impl <B: Backend> ModelLoader<B> {
	/// `artifact` is the recorder path without extension (`models/2` reads `models/2.mpk`).
	pub fn new<P: AsRef<Path>>(artifact: P, device: B::Device) -> Self {
		Self {
			artifact: artifact.as_ref().to_path_buf(),
			device,
			model: OnceCell::new(),
		}
	}

	pub fn load(&self) -> Result<Arc<BurnClassifier<B>>, PlantDiseaseError> {
		self.model
			.get_or_try_init(|| {
				log::info!("Loading model from {:?}", self.artifact);

				let record = CompactRecorder::new()
					.load(self.artifact.clone(), &self.device)
					.map_err(|err| PlantDiseaseError::ModelLoad {
						path: self.artifact.clone(),
						reason: format!("{err:?}"),
					})?;

				let model = LeafClassifierConfig::new().init::<B>(&self.device).load_record(record);
				Ok(Arc::new(BurnClassifier::new(model, self.device.clone())))
			})
			.cloned()
	}
}

/// Index and value of the largest entry. Ties go to the first occurrence and
/// NaN never wins.
pub fn argmax(values: &[f32]) -> Option<(usize, f32)> {
	let mut best: Option<(usize, f32)> = None;

	for (index, &value) in values.iter().enumerate() {
		match best {
			_ if value.is_nan() => {}
			Some((_, top)) if value <= top => {}
			_ => best = Some((index, value)),
		}
	}

	best
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
	pub label: String,
	/// Probability of `label`, in `0.0..=1.0`.
	pub confidence: f32,
}

impl Prediction {
	pub fn confidence_percent(&self) -> f64 {
		f64::from(self.confidence) * 100.0
	}
}

#[derive(Clone)]
pub struct Pipeline {
	classifier: Arc<dyn Classifier>,
	registry: Arc<ClassRegistry>,
}

impl Pipeline {
	pub fn new(classifier: Arc<dyn Classifier>, registry: ClassRegistry) -> Self {
		if classifier.num_classes() != registry.len() {
			log::warn!(
				"Model has {} outputs but the training folder lists {} classes; predictions will be mislabelled",
				classifier.num_classes(),
				registry.len()
			);
		}

		Self {
			classifier,
			registry: Arc::new(registry),
		}
	}

	pub fn registry(&self) -> &ClassRegistry {
		&self.registry
	}

	pub fn predict(&self, image: &LeafImage) -> Result<Prediction, PlantDiseaseError> {
		let probabilities = self.classifier.predict(image)?;
		let (index, confidence) = argmax(&probabilities).ok_or(PlantDiseaseError::NoPrediction)?;

		let label = self.registry.get(index).ok_or(PlantDiseaseError::ClassIndexOutOfRange {
			index,
			len: self.registry.len(),
		})?;

		Ok(Prediction {
			label: label.to_string(),
			confidence,
		})
	}
}
