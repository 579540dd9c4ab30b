use crate::i18n::{translate_disease, Language};

pub const DELIMITER: &str = "___";
pub const UNKNOWN_DISEASE: &str = "Unknown";

/// A class label split into its plant and disease parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassLabel<'a> {
	pub raw: &'a str,
	pub plant: &'a str,
	pub disease: &'a str,
}

impl<'a> ClassLabel<'a> {
	/// Splits on the first `___`. Labels without a usable delimiter keep the
	/// whole label as the plant and get `Unknown` as the disease.
	pub fn parse(raw: &'a str) -> Self {
		match raw.split_once(DELIMITER) {
			Some((plant, disease)) if !plant.is_empty() && !disease.is_empty() => Self { raw, plant, disease },
			_ => Self {
				raw,
				plant: raw,
				disease: UNKNOWN_DISEASE,
			},
		}
	}

	pub fn plant_name(&self) -> String {
		humanize(self.plant)
	}

	pub fn disease_name(&self, language: Language) -> String {
		if language.translates_diseases() {
			translate_disease(self.raw, self.disease)
		} else {
			humanize(self.disease)
		}
	}
}

pub fn humanize(name: &str) -> String {
	name.replace('_', " ")
}
