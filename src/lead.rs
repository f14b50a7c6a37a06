//! Inbound booking submissions and the CRM lead records derived from them.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{_prelude::*, error::InputError};

/// Placeholder used for name parts and company when the booking omits them.
pub const UNKNOWN: &str = "Unknown";
/// Lead source recorded on every relayed lead.
pub const LEAD_SOURCE: &str = "Website";

/// Booking form submission posted by the website. Every field is optional; `null` counts as
/// absent. Numbers and booleans are accepted and kept in their JSON text form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingSubmission {
	/// Full name, `"First Last"`.
	#[serde(deserialize_with = "scalar_text")]
	pub name: Option<String>,
	/// Company name.
	#[serde(deserialize_with = "scalar_text")]
	pub company: Option<String>,
	/// Contact email.
	#[serde(deserialize_with = "scalar_text")]
	pub email: Option<String>,
	/// Contact phone.
	#[serde(deserialize_with = "scalar_text")]
	pub phone: Option<String>,
	/// Free-form notes.
	#[serde(deserialize_with = "scalar_text")]
	pub additional_info: Option<String>,
	/// Street address.
	#[serde(deserialize_with = "scalar_text")]
	pub street: Option<String>,
	/// City.
	#[serde(deserialize_with = "scalar_text")]
	pub city: Option<String>,
	/// State or region.
	#[serde(deserialize_with = "scalar_text")]
	pub state: Option<String>,
	/// Postal code.
	#[serde(deserialize_with = "scalar_text")]
	pub zip_code: Option<String>,
}
impl BookingSubmission {
	/// Parses a raw request body, reporting the JSON path of the first offending value.
	pub fn from_slice(body: &[u8]) -> Result<Self, InputError> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let booking = serde_path_to_error::deserialize(&mut de)?;

		de.end().map_err(|source| InputError::InvalidJson { path: ".".into(), source })?;

		Ok(booking)
	}

	/// Splits the name into first and last parts, defaulting each to [`UNKNOWN`].
	///
	/// The first whitespace-separated word becomes the first name; the remaining words, joined by
	/// a single space, become the last name.
	pub fn name_parts(&self) -> (String, String) {
		let mut words = self.name.as_deref().unwrap_or_default().split_whitespace();
		let first = words.next().unwrap_or(UNKNOWN).to_owned();
		let rest = words.collect::<Vec<_>>().join(" ");
		let last = if rest.is_empty() { UNKNOWN.to_owned() } else { rest };

		(first, last)
	}
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<serde_json::Value>::deserialize(deserializer)? {
		None | Some(serde_json::Value::Null) => Ok(None),
		Some(serde_json::Value::String(text)) => Ok(Some(text)),
		Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
		Some(serde_json::Value::Bool(flag)) => Ok(Some(flag.to_string())),
		Some(other) => Err(D::Error::custom(format!(
			"expected a string, number, or boolean, found {}",
			if other.is_array() { "an array" } else { "an object" }
		))),
	}
}

/// Lead record in the shape expected by the Zoho CRM Leads module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPayload {
	/// Company, [`UNKNOWN`] when absent.
	#[serde(rename = "Company")]
	pub company: String,
	/// First word of the booking name.
	#[serde(rename = "First_Name")]
	pub first_name: String,
	/// Remaining words of the booking name.
	#[serde(rename = "Last_Name")]
	pub last_name: String,
	/// Contact email.
	#[serde(rename = "Email")]
	pub email: String,
	/// Contact phone.
	#[serde(rename = "Phone")]
	pub phone: String,
	/// Booking notes.
	#[serde(rename = "Description")]
	pub description: String,
	/// Street address.
	#[serde(rename = "Street")]
	pub street: String,
	/// City.
	#[serde(rename = "City")]
	pub city: String,
	/// State or region.
	#[serde(rename = "State")]
	pub state: String,
	/// Postal code.
	#[serde(rename = "Zip_Code")]
	pub zip_code: String,
	/// Always [`LEAD_SOURCE`].
	#[serde(rename = "Lead_Source")]
	pub lead_source: String,
}
impl LeadPayload {
	/// Wraps the payload in the `{"data": [...]}` envelope of the create-records API.
	pub fn envelope(&self) -> LeadEnvelope<'_> {
		LeadEnvelope { data: std::slice::from_ref(self) }
	}
}
impl From<&BookingSubmission> for LeadPayload {
	fn from(booking: &BookingSubmission) -> Self {
		let (first_name, last_name) = booking.name_parts();
		let text = |field: &Option<String>| field.clone().unwrap_or_default();
		let company = booking
			.company
			.as_deref()
			.filter(|company| !company.is_empty())
			.unwrap_or(UNKNOWN)
			.to_owned();

		Self {
			company,
			first_name,
			last_name,
			email: text(&booking.email),
			phone: text(&booking.phone),
			description: text(&booking.additional_info),
			street: text(&booking.street),
			city: text(&booking.city),
			state: text(&booking.state),
			zip_code: text(&booking.zip_code),
			lead_source: LEAD_SOURCE.to_owned(),
		}
	}
}

/// Request body for the create-records call.
#[derive(Debug, Serialize)]
pub struct LeadEnvelope<'a> {
	/// Records to create; the relay always sends exactly one.
	pub data: &'a [LeadPayload],
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn booking(json: &str) -> BookingSubmission {
		BookingSubmission::from_slice(json.as_bytes()).expect("Booking fixture should parse.")
	}

	#[test]
	fn multi_word_names_split_on_first_word() {
		let lead = LeadPayload::from(&booking(r#"{"name":"  Mary\tAnn  van Dyke "}"#));

		assert_eq!(lead.first_name, "Mary");
		assert_eq!(lead.last_name, "Ann van Dyke");
	}

	#[test]
	fn single_word_name_defaults_last_name() {
		let lead = LeadPayload::from(&booking(r#"{"name":"Cher"}"#));

		assert_eq!(lead.first_name, "Cher");
		assert_eq!(lead.last_name, UNKNOWN);
	}

	#[test]
	fn absent_or_blank_name_defaults_both_parts() {
		for json in [r#"{}"#, r#"{"name":""}"#, r#"{"name":"   "}"#, r#"{"name":null}"#] {
			let lead = LeadPayload::from(&booking(json));

			assert_eq!(lead.first_name, UNKNOWN, "first name for {json}");
			assert_eq!(lead.last_name, UNKNOWN, "last name for {json}");
		}
	}

	#[test]
	fn absent_fields_map_to_defaults() {
		let lead = LeadPayload::from(&booking(r#"{"name":"Jane Doe","email":"j@x.com"}"#));

		assert_eq!(
			lead,
			LeadPayload {
				company: UNKNOWN.into(),
				first_name: "Jane".into(),
				last_name: "Doe".into(),
				email: "j@x.com".into(),
				phone: String::new(),
				description: String::new(),
				street: String::new(),
				city: String::new(),
				state: String::new(),
				zip_code: String::new(),
				lead_source: LEAD_SOURCE.into(),
			}
		);
	}

	#[test]
	fn empty_company_is_unknown() {
		let lead = LeadPayload::from(&booking(r#"{"company":""}"#));

		assert_eq!(lead.company, UNKNOWN);
	}

	#[test]
	fn envelope_uses_crm_field_names() {
		let lead = LeadPayload::from(&booking(
			r#"{"name":"Jane Doe","company":"Acme","additionalInfo":"2 guests","zipCode":"94105"}"#,
		));
		let json = serde_json::to_value(lead.envelope()).expect("Envelope should serialize.");
		let record = &json["data"][0];

		assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
		assert_eq!(record["Company"], "Acme");
		assert_eq!(record["Description"], "2 guests");
		assert_eq!(record["Zip_Code"], "94105");
		assert_eq!(record["Lead_Source"], "Website");
	}

	#[test]
	fn malformed_bodies_are_rejected() {
		for body in ["{", "not json", "[]", "null", "{} trailing"] {
			assert!(BookingSubmission::from_slice(body.as_bytes()).is_err(), "body {body:?}");
		}
	}

	#[test]
	fn scalar_values_are_kept_as_text() {
		let lead = LeadPayload::from(&booking(
			r#"{"name":"Jane Doe","phone":5551234,"zipCode":94105,"company":true}"#,
		));

		assert_eq!(lead.phone, "5551234");
		assert_eq!(lead.zip_code, "94105");
		assert_eq!(lead.company, "true");
	}

	#[test]
	fn nested_values_are_rejected_with_their_path() {
		let err = BookingSubmission::from_slice(br#"{"city":{"name":"Austin"}}"#)
			.expect_err("Object-valued fields should be rejected.");

		assert!(err.to_string().contains("city"), "{err}");
	}

	#[test]
	fn unknown_fields_are_ignored() {
		let parsed = booking(r#"{"name":"Jane Doe","utm_source":"ads"}"#);

		assert_eq!(parsed.name.as_deref(), Some("Jane Doe"));
	}
}
