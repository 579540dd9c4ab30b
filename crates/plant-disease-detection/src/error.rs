use std::path::PathBuf;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlantDiseaseError {
	#[error("Model could not be loaded from {path:?}: {reason}")]
	ModelLoad { path: PathBuf, reason: String },
	#[error("Training folder not found: {0:?}")]
	FolderNotFound(PathBuf),
	#[error("Std IO error: {0}")]
	StdIoError(#[from] std::io::Error),
	#[error("No image file in upload")]
	MissingUpload,
	#[error("Unsupported image type, expected JPEG or PNG")]
	UnsupportedImageType,
	#[error("Image could not be decoded: {0}")]
	ImageDecode(#[from] image::ImageError),
	#[error("Invalid upload: {0}")]
	Multipart(#[from] MultipartError),
	#[error("Inference failed: {0}")]
	Inference(String),
	#[error("Model returned no usable probabilities")]
	NoPrediction,
	#[error("Predicted class index {index} is outside the {len} registered classes")]
	ClassIndexOutOfRange { index: usize, len: usize },
}

impl PlantDiseaseError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::MissingUpload | Self::ImageDecode(_) | Self::Multipart(_) => StatusCode::BAD_REQUEST,
			Self::UnsupportedImageType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			Self::ModelLoad { .. } | Self::FolderNotFound(_) => StatusCode::SERVICE_UNAVAILABLE,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for PlantDiseaseError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			log::error!("Request failed: {self}");
		} else {
			log::warn!("Request rejected: {self}");
		}
		(status, self.to_string()).into_response()
	}
}
