use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::label::humanize;

/// Shown above the language radio buttons in both languages at once.
pub const LANGUAGE_PROMPT: &str = "🌍 भाषा चुनें / Select Language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Language {
	#[default]
	#[serde(rename = "hi")]
	Hindi,
	#[serde(rename = "en")]
	English,
}

impl Language {
	/// Radio button order.
	pub const ALL: [Language; 2] = [Language::Hindi, Language::English];

	pub fn from_code(code: &str) -> Option<Self> {
		match code.trim() {
			"hi" => Some(Language::Hindi),
			"en" => Some(Language::English),
			_ => None,
		}
	}

	pub fn code(self) -> &'static str {
		match self {
			Language::Hindi => "hi",
			Language::English => "en",
		}
	}

	pub fn display_name(self) -> &'static str {
		match self {
			Language::Hindi => "हिन्दी",
			Language::English => "English",
		}
	}

	pub fn texts(self) -> &'static Texts {
		match self {
			Language::Hindi => &HINDI,
			Language::English => &ENGLISH,
		}
	}

	/// Whether disease names go through the translation table.
	pub fn translates_diseases(self) -> bool {
		matches!(self, Language::Hindi)
	}
}

#[derive(Debug)]
pub struct Texts {
	pub title: &'static str,
	pub upload: &'static str,
	pub result: &'static str,
	pub plant: &'static str,
	pub disease: &'static str,
	pub confidence: &'static str,
	pub low_conf: &'static str,
	pub loading: &'static str,
	pub model_error: &'static str,
	pub folder_error: &'static str,
	pub developer: &'static str,
}

static HINDI: Texts = Texts {
	title: "🌿 AI आधारित पौधा रोग पहचान प्रणाली",
	upload: "📸 पत्ते की फोटो अपलोड करें",
	result: "🔍 परिणाम",
	plant: "🌱 पौधा",
	disease: "🦠 रोग",
	confidence: "📊 विश्वास स्तर",
	low_conf: "⚠ विश्वास स्तर कम है। कृपया स्पष्ट फोटो अपलोड करें।",
	loading: "🔄 रोग की पहचान की जा रही है...",
	model_error: "⚠ मॉडल लोड नहीं हो पाया।",
	folder_error: "⚠ Training folder नहीं मिला।",
	developer: "👨‍💻 विकसितकर्ता: Satyendra Saini (NIELIT Ajmer)",
};

static ENGLISH: Texts = Texts {
	title: "🌿 AI Based Plant Disease Detection System",
	upload: "📸 Upload Leaf Image",
	result: "🔍 Prediction Result",
	plant: "🌱 Plant",
	disease: "🦠 Disease",
	confidence: "📊 Confidence Level",
	low_conf: "⚠ Low confidence. Please upload a clear image.",
	loading: "🔄 Detecting disease...",
	model_error: "⚠ Model could not be loaded.",
	folder_error: "⚠ Training folder not found.",
	developer: "👨‍💻 Developer: Satyendra Saini (NIELIT Ajmer)",
};

/// Hindi disease phrases keyed by the raw PlantVillage class label.
static DISEASE_TRANSLATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
	HashMap::from([
		// Pepper (Capsicum)
		("Pepper__bell___Bacterial_spot", "शिमला मिर्च बैक्टीरियल स्पॉट रोग"),
		("Pepper__bell___healthy", "शिमला मिर्च स्वस्थ है"),
		// Potato
		("Potato___Early_blight", "आलू अर्ली ब्लाइट रोग"),
		("Potato___Late_blight", "आलू लेट ब्लाइट रोग"),
		("Potato___healthy", "आलू स्वस्थ है"),
		// Tomato
		("Tomato___Bacterial_spot", "टमाटर बैक्टीरियल स्पॉट रोग"),
		("Tomato___Early_blight", "टमाटर अर्ली ब्लाइट रोग"),
		("Tomato___Late_blight", "टमाटर लेट ब्लाइट रोग"),
		("Tomato___Leaf_Mold", "टमाटर लीफ मोल्ड रोग"),
		("Tomato___Septoria_leaf_spot", "टमाटर सेप्टोरिया पत्ती धब्बा रोग"),
		("Tomato___Spider_mites_Two_spotted_spider_mite", "टमाटर स्पाइडर माइट्स रोग"),
		("Tomato___Target_Spot", "टमाटर टार्गेट स्पॉट रोग"),
		("Tomato___Tomato_mosaic_virus", "टमाटर मोज़ेक वायरस रोग"),
		("Tomato___Tomato_YellowLeaf_Curl_Virus", "टमाटर पीला पत्ता मरोड़ वायरस"),
		("Tomato___healthy", "टमाटर स्वस्थ है"),
	])
});

/// Hindi name for the disease of `label`, falling back to the humanized
/// English `disease` part when the table has no entry.
pub fn translate_disease(label: &str, disease: &str) -> String {
	match DISEASE_TRANSLATIONS.get(label) {
		Some(phrase) => phrase.to_string(),
		None => humanize(disease),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_entries_win_over_fallback() {
		assert_eq!(translate_disease("Potato___Late_blight", "Late_blight"), "आलू लेट ब्लाइट रोग");
		assert_eq!(translate_disease("Tomato___healthy", "healthy"), "टमाटर स्वस्थ है");
		assert_eq!(
			translate_disease("Pepper__bell___Bacterial_spot", "Bacterial_spot"),
			"शिमला मिर्च बैक्टीरियल स्पॉट रोग"
		);
	}

	#[test]
	fn every_table_entry_is_used_verbatim() {
		for (label, phrase) in DISEASE_TRANSLATIONS.iter() {
			let (_, disease) = label.split_once("___").unwrap();
			assert_eq!(translate_disease(label, disease), *phrase);
		}
		assert_eq!(DISEASE_TRANSLATIONS.len(), 15);
	}

	#[test]
	fn missing_labels_fall_back_to_spaced_english() {
		assert_eq!(translate_disease("Apple___Black_rot", "Black_rot"), "Black rot");
		assert_eq!(translate_disease("Corn___Common_rust_", "Common_rust_"), "Common rust ");
		assert_eq!(translate_disease("Tomato__Target_Spot", "Unknown"), "Unknown");
	}

	#[test]
	fn language_codes_round_trip() {
		for language in Language::ALL {
			assert_eq!(Language::from_code(language.code()), Some(language));
		}
		assert_eq!(Language::from_code("fr"), None);
		assert_eq!(Language::default(), Language::Hindi);
	}

	#[test]
	fn only_hindi_translates() {
		assert!(Language::Hindi.translates_diseases());
		assert!(!Language::English.translates_diseases());
		assert_ne!(Language::Hindi.texts().title, Language::English.texts().title);
	}
}
