use std::fmt::Write;

use crate::i18n::{Language, Texts, LANGUAGE_PROMPT};
use crate::infer::Prediction;
use crate::label::ClassLabel;

const SUCCESS_ABOVE: f64 = 80.0;
const WARNING_ABOVE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
	Success,
	Warning,
	LowConfidence,
}

impl Severity {
	pub fn from_confidence(percent: f64) -> Self {
		if percent > SUCCESS_ABOVE {
			Severity::Success
		} else if percent > WARNING_ABOVE {
			Severity::Warning
		} else {
			Severity::LowConfidence
		}
	}

	fn css_class(self) -> &'static str {
		match self {
			Severity::Success => "success",
			Severity::Warning => "warning",
			Severity::LowConfidence => "error",
		}
	}
}

/// What the result section shows for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
	pub severity: Severity,
	pub messages: Vec<String>,
	pub confidence: Option<String>,
}

impl ResultView {
	pub fn new(prediction: &Prediction, language: Language) -> Self {
		let texts = language.texts();
		let percent = prediction.confidence_percent();
		let severity = Severity::from_confidence(percent);

		if severity == Severity::LowConfidence {
			return Self {
				severity,
				messages: vec![texts.low_conf.to_string()],
				confidence: None,
			};
		}

		let label = ClassLabel::parse(&prediction.label);
		Self {
			severity,
			messages: vec![
				format!("{}: {}", texts.plant, label.plant_name()),
				format!("{}: {}", texts.disease, label.disease_name(language)),
			],
			confidence: Some(format!("{}: {} %", texts.confidence, round2(percent))),
		}
	}
}

/// Two decimal places, printed without trailing zeros.
fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

/// Everything below the title: a fatal startup message, or the upload form
/// with an optional result.
pub enum Body<'a> {
	Fatal(&'a str),
	Form {
		preview: Option<String>,
		result: Option<ResultView>,
	},
}

pub fn page(language: Language, body: &Body<'_>) -> String {
	let texts = language.texts();
	let mut html = String::with_capacity(4096);

	html.push_str("<!DOCTYPE html>\n");
	let _ = write!(html, "<html lang=\"{}\">\n<head>\n", language.code());
	html.push_str("<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
	html.push_str("<title>Plant Disease Detection</title>\n");
	html.push_str("<link rel=\"icon\" href=\"data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🌿</text></svg>\">\n");
	html.push_str(STYLE);
	html.push_str("</head>\n<body>\n<main>\n");

	language_selector(&mut html, language);
	let _ = writeln!(html, "<h1>{}</h1>", escape(texts.title));

	match body {
		Body::Fatal(message) => message_box(&mut html, "error", message),
		Body::Form { preview, result } => {
			upload_form(&mut html, language, texts);

			if let Some(preview) = preview {
				let _ = writeln!(
					html,
					"<figure><img src=\"{}\" alt=\"Preview\"><figcaption>Preview</figcaption></figure>",
					escape(preview)
				);
			}

			if let Some(result) = result {
				let _ = writeln!(html, "<h2>{}</h2>", escape(texts.result));
				for message in &result.messages {
					message_box(&mut html, result.severity.css_class(), message);
				}
				if let Some(confidence) = &result.confidence {
					message_box(&mut html, "info", confidence);
				}
			}
		}
	}

	html.push_str("<hr>\n");
	let _ = writeln!(html, "<footer>{}</footer>", escape(texts.developer));
	html.push_str("</main>\n</body>\n</html>\n");

	html
}

fn language_selector(html: &mut String, current: Language) {
	html.push_str("<form class=\"language\" method=\"get\" action=\"/\">\n");
	let _ = writeln!(html, "<p>{}</p>", escape(LANGUAGE_PROMPT));
	for language in Language::ALL {
		let _ = writeln!(
			html,
			"<label><input type=\"radio\" name=\"lang\" value=\"{}\"{} onchange=\"this.form.submit()\"> {}</label>",
			language.code(),
			if language == current { " checked" } else { "" },
			escape(language.display_name()),
		);
	}
	html.push_str("<noscript><button type=\"submit\">OK</button></noscript>\n</form>\n");
}

fn upload_form(html: &mut String, language: Language, texts: &Texts) {
	html.push_str(
		"<form class=\"upload\" method=\"post\" action=\"/predict\" enctype=\"multipart/form-data\" \
		 onsubmit=\"document.getElementById('loading').hidden = false\">\n",
	);
	let _ = writeln!(html, "<input type=\"hidden\" name=\"lang\" value=\"{}\">", language.code());
	let _ = writeln!(html, "<label for=\"file\">{}</label>", escape(texts.upload));
	html.push_str(
		"<input type=\"file\" id=\"file\" name=\"file\" accept=\".jpg,.jpeg,.png,image/jpeg,image/png\" required \
		 onchange=\"this.form.requestSubmit()\">\n",
	);
	let _ = writeln!(html, "<noscript><button type=\"submit\">{}</button></noscript>", escape(texts.upload));
	let _ = writeln!(html, "<p id=\"loading\" hidden>{}</p>", escape(texts.loading));
	html.push_str("</form>\n");
}

fn message_box(html: &mut String, class: &str, message: &str) {
	let _ = writeln!(html, "<div class=\"msg {class}\">{}</div>", escape(message));
}

fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			_ => escaped.push(c),
		}
	}
	escaped
}

const STYLE: &str = "<style>
main { max-width: 46rem; margin: 2rem auto; font-family: sans-serif; padding: 0 1rem; }
.msg { padding: .75rem 1rem; border-radius: .5rem; margin: .5rem 0; }
.success { background: #dff5e3; color: #14532d; }
.warning { background: #fff6d6; color: #713f12; }
.error { background: #fde2e2; color: #7f1d1d; }
.info { background: #e0efff; color: #1e3a8a; }
figure img { max-width: 100%; }
.language label { margin-right: 1rem; }
</style>
";
