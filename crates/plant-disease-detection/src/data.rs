use std::path::Path;

use crate::error::PlantDiseaseError;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::{imageops, ImageFormat, RgbImage};

pub const SIDE_LENGTH: u32 = 256;

/// Ordered class labels. Index `i` names output `i` of the model.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
	labels: Vec<String>,
}

impl ClassRegistry {
	/// Every immediate child of `data_folder`, sorted by name.
	///
	/// The order is assumed to match the one the model was trained with.
	/// Nothing checks this; renaming or adding a folder shifts every label.
	pub fn from_folder<A: AsRef<Path>>(data_folder: A) -> Result<Self, PlantDiseaseError> {
		let data_folder = data_folder.as_ref();
		if !data_folder.exists() {
			return Err(PlantDiseaseError::FolderNotFound(data_folder.to_path_buf()));
		}

		let mut labels = data_folder
			.read_dir()?
			.map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
			.collect::<Result<Vec<_>, _>>()?;
		labels.sort();

		Ok(Self { labels })
	}

	#[cfg(test)]
	pub fn from_labels<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Self {
		Self {
			labels: labels.into_iter().map(Into::into).collect(),
		}
	}

	pub fn get(&self, index: usize) -> Option<&str> {
		self.labels.get(index).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}
}

/// An uploaded leaf photo, ready for the model.
#[derive(Debug, Clone)]
pub struct LeafImage {
	/// `[1, 256, 256, 3]` row-major, values in `0.0..=255.0`.
	pub pixels: Vec<f32>,
	format: ImageFormat,
	encoded: Vec<u8>,
}

impl LeafImage {
	pub const SHAPE: [usize; 4] = [1, SIDE_LENGTH as usize, SIDE_LENGTH as usize, 3];

	/// Accepts JPEG and PNG only, sniffed from the bytes themselves.
	pub fn decode(bytes: Vec<u8>) -> Result<Self, PlantDiseaseError> {
		let format = image::guess_format(&bytes).map_err(|_| PlantDiseaseError::UnsupportedImageType)?;
		if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
			return Err(PlantDiseaseError::UnsupportedImageType);
		}

		let image = image::load_from_memory_with_format(&bytes, format)?.to_rgb8();

		Ok(Self {
			pixels: Self::to_pixels(image),
			format,
			encoded: bytes,
		})
	}

	fn to_pixels(mut image: RgbImage) -> Vec<f32> {
		if image.dimensions() != (SIDE_LENGTH, SIDE_LENGTH) {
			image = imageops::resize(&image, SIDE_LENGTH, SIDE_LENGTH, imageops::FilterType::CatmullRom);
		}

		image.into_raw().into_iter().map(f32::from).collect()
	}

	/// The original upload as a `data:` URI for the preview.
	pub fn preview_uri(&self) -> String {
		format!(
			"data:{};base64,{}",
			self.format.to_mime_type(),
			BASE64_STANDARD.encode(&self.encoded)
		)
	}
}

/// Upload filter applied before the bytes are looked at.
pub fn accepted_upload(file_name: Option<&str>, content_type: Option<&str>) -> bool {
	let by_extension = file_name
		.and_then(|name| Path::new(name).extension())
		.and_then(|ext| ext.to_str())
		.map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"));

	match by_extension {
		Some(accepted) => accepted,
		None => matches!(content_type, Some("image/jpeg" | "image/jpg" | "image/png")),
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use image::{DynamicImage, Rgb};
	use std::fs;
	use std::io::Cursor;

	pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
		let image = RgbImage::from_pixel(width, height, Rgb([10, 200, 30]));
		let mut bytes = Cursor::new(Vec::new());
		DynamicImage::ImageRgb8(image).write_to(&mut bytes, format).unwrap();
		bytes.into_inner()
	}

	#[test]
	fn registry_is_sorted_folder_listing() {
		let dir = tempfile::tempdir().unwrap();
		for name in ["Tomato___healthy", "Potato___Early_blight", "Pepper__bell___healthy", "Potato___Late_blight"] {
			fs::create_dir(dir.path().join(name)).unwrap();
		}

		let registry = ClassRegistry::from_folder(dir.path()).unwrap();
		assert_eq!(registry.len(), 4);
		assert_eq!(registry.get(0), Some("Pepper__bell___healthy"));
		assert_eq!(registry.get(1), Some("Potato___Early_blight"));
		assert_eq!(registry.get(2), Some("Potato___Late_blight"));
		assert_eq!(registry.get(3), Some("Tomato___healthy"));
		assert_eq!(registry.get(4), None);
	}

	#[test]
	fn registry_counts_plain_files_too() {
		let dir = tempfile::tempdir().unwrap();
		fs::create_dir(dir.path().join("b")).unwrap();
		fs::write(dir.path().join("a.txt"), "x").unwrap();

		let registry = ClassRegistry::from_folder(dir.path()).unwrap();
		assert_eq!(registry.get(0), Some("a.txt"));
		assert_eq!(registry.get(1), Some("b"));
	}

	#[test]
	fn missing_folder_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("PlantVillage");

		match ClassRegistry::from_folder(&missing) {
			Err(PlantDiseaseError::FolderNotFound(path)) => assert_eq!(path, missing),
			other => panic!("expected FolderNotFound, got {other:?}"),
		}
	}

	#[test]
	fn decode_resizes_to_side_length() {
		let image = LeafImage::decode(encoded_image(40, 90, ImageFormat::Png)).unwrap();
		assert_eq!(image.pixels.len(), 256 * 256 * 3);
		assert!(image.preview_uri().starts_with("data:image/png;base64,"));

		let jpeg = LeafImage::decode(encoded_image(300, 120, ImageFormat::Jpeg)).unwrap();
		assert_eq!(jpeg.pixels.len(), LeafImage::SHAPE.iter().product::<usize>());
		assert!(jpeg.preview_uri().starts_with("data:image/jpeg;base64,"));
	}

	#[test]
	fn decode_keeps_raw_channel_values() {
		let image = LeafImage::decode(encoded_image(256, 256, ImageFormat::Png)).unwrap();
		assert_eq!(&image.pixels[..3], &[10.0, 200.0, 30.0]);
		assert!(image.pixels.iter().all(|&p| (0.0..=255.0).contains(&p)));
	}

	#[test]
	fn decode_rejects_other_formats() {
		let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00".to_vec();
		assert!(matches!(LeafImage::decode(gif), Err(PlantDiseaseError::UnsupportedImageType)));
		assert!(matches!(
			LeafImage::decode(b"not an image".to_vec()),
			Err(PlantDiseaseError::UnsupportedImageType)
		));
	}

	#[test]
	fn truncated_png_is_a_decode_error() {
		let mut bytes = encoded_image(16, 16, ImageFormat::Png);
		bytes.truncate(40);
		assert!(matches!(LeafImage::decode(bytes), Err(PlantDiseaseError::ImageDecode(_))));
	}

	#[test]
	fn upload_filter_checks_extension_then_mime() {
		assert!(accepted_upload(Some("leaf.JPG"), None));
		assert!(accepted_upload(Some("leaf.jpeg"), Some("application/octet-stream")));
		assert!(accepted_upload(Some("leaf.png"), None));
		assert!(!accepted_upload(Some("leaf.gif"), Some("image/png")));
		assert!(accepted_upload(None, Some("image/png")));
		assert!(accepted_upload(Some("blob"), Some("image/jpeg")));
		assert!(!accepted_upload(None, None));
	}
}
