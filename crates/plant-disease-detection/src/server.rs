//! HTTP surface: the form page, the upload endpoint and a health probe.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::data::{accepted_upload, ClassRegistry, LeafImage};
use crate::error::PlantDiseaseError;
use crate::i18n::Language;
use crate::infer::{Classifier, Pipeline};
use crate::render::{self, Body, ResultView};

/// Startup conditions that stop every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
	Model,
	ClassFolder,
}

impl Fatal {
	fn message(self, language: Language) -> &'static str {
		let texts = language.texts();
		match self {
			Fatal::Model => texts.model_error,
			Fatal::ClassFolder => texts.folder_error,
		}
	}
}

pub enum Readiness {
	Ready(Pipeline),
	Failed(Fatal),
}

impl Readiness {
	/// The model is checked before the class folder; the first failure wins.
	pub fn start(model: Result<Arc<dyn Classifier>, PlantDiseaseError>, data_folder: &Path) -> Self {
		let classifier = match model {
			Ok(classifier) => classifier,
			Err(err) => {
				log::error!("{err}");
				return Readiness::Failed(Fatal::Model);
			}
		};

		match ClassRegistry::from_folder(data_folder) {
			Ok(registry) => {
				if registry.is_empty() {
					log::warn!("Training folder {:?} is empty", data_folder);
				}
				log::info!("Loaded {} classes from {:?}", registry.len(), data_folder);
				Readiness::Ready(Pipeline::new(classifier, registry))
			}
			Err(err) => {
				log::error!("{err}");
				Readiness::Failed(Fatal::ClassFolder)
			}
		}
	}
}

pub struct AppState {
	pub readiness: Readiness,
	pub started_at: Instant,
}

impl AppState {
	pub fn new(readiness: Readiness) -> Self {
		Self {
			readiness,
			started_at: Instant::now(),
		}
	}
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState, max_upload_bytes: usize) -> Router {
	Router::new()
		.route("/", get(index))
		.route("/predict", post(predict))
		.route("/health", get(health))
		.layer(DefaultBodyLimit::max(max_upload_bytes))
		.with_state(state)
}

/// Binds `host:port`; `host` may be a name such as `localhost`.
pub async fn listen(host: &str, port: u16) -> std::io::Result<tokio::net::TcpListener> {
	tokio::net::TcpListener::bind((host, port)).await
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
	lang: Option<String>,
}

impl PageQuery {
	/// Unknown or missing codes fall back to the default language.
	fn language(&self) -> Language {
		self.lang.as_deref().and_then(Language::from_code).unwrap_or_default()
	}
}

fn fatal_page(fatal: Fatal, language: Language) -> Response {
	let html = render::page(language, &Body::Fatal(fatal.message(language)));
	(StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response()
}

/// GET / - Form page
async fn index(State(state): State<SharedState>, Query(query): Query<PageQuery>) -> Response {
	let language = query.language();
	match &state.readiness {
		Readiness::Failed(fatal) => fatal_page(*fatal, language),
		Readiness::Ready(_) => {
			let body = Body::Form {
				preview: None,
				result: None,
			};
			Html(render::page(language, &body)).into_response()
		}
	}
}

struct Upload {
	language: Language,
	image: Option<Vec<u8>>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, PlantDiseaseError> {
	let mut upload = Upload {
		language: Language::default(),
		image: None,
	};

	while let Some(field) = multipart.next_field().await? {
		match field.name() {
			Some("lang") => {
				let code = field.text().await?;
				upload.language = Language::from_code(&code).unwrap_or_default();
			}
			Some("file") => {
				if field.file_name() == Some("") {
					// browsers send an empty part when nothing was chosen
					continue;
				}
				if !accepted_upload(field.file_name(), field.content_type()) {
					return Err(PlantDiseaseError::UnsupportedImageType);
				}
				upload.image = Some(field.bytes().await?.to_vec());
			}
			_ => {}
		}
	}

	Ok(upload)
}

/// Only the `lang` field, for the fatal page. A malformed body just means the
/// default language.
async fn read_language(mut multipart: Multipart) -> Language {
	while let Ok(Some(field)) = multipart.next_field().await {
		if field.name() == Some("lang") {
			return match field.text().await {
				Ok(code) => Language::from_code(&code).unwrap_or_default(),
				Err(_) => Language::default(),
			};
		}
	}
	Language::default()
}

/// POST /predict - Classify an uploaded leaf photo
async fn predict(State(state): State<SharedState>, multipart: Multipart) -> Result<Response, PlantDiseaseError> {
	let pipeline = match &state.readiness {
		Readiness::Failed(fatal) => return Ok(fatal_page(*fatal, read_language(multipart).await)),
		Readiness::Ready(pipeline) => pipeline.clone(),
	};

	let upload = read_upload(multipart).await?;
	let language = upload.language;

	let Some(bytes) = upload.image.filter(|bytes| !bytes.is_empty()) else {
		return Err(PlantDiseaseError::MissingUpload);
	};

	let (image, prediction) = tokio::task::spawn_blocking(move || {
		let image = LeafImage::decode(bytes)?;
		let prediction = pipeline.predict(&image)?;
		Ok::<_, PlantDiseaseError>((image, prediction))
	})
	.await
	.map_err(|err| PlantDiseaseError::Inference(err.to_string()))??;

	log::info!(
		"Predicted {} with confidence {:.2}%",
		prediction.label,
		prediction.confidence_percent()
	);

	let body = Body::Form {
		preview: Some(image.preview_uri()),
		result: Some(ResultView::new(&prediction, language)),
	};
	Ok(Html(render::page(language, &body)).into_response())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub classes: usize,
	pub uptime_seconds: u64,
	pub version: &'static str,
}

/// GET /health - Health check endpoint
async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
	let (status, code, classes) = match &state.readiness {
		Readiness::Ready(pipeline) => ("ok", StatusCode::OK, pipeline.registry().len()),
		Readiness::Failed(_) => ("unavailable", StatusCode::SERVICE_UNAVAILABLE, 0),
	};

	(
		code,
		Json(HealthResponse {
			status,
			classes,
			uptime_seconds: state.started_at.elapsed().as_secs(),
			version: env!("CARGO_PKG_VERSION"),
		}),
	)
}
