use serde::{Deserialize, Serialize};

/// A postal address used for billing or shipping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub first_name: String,
  pub last_name: String,
  pub street: String,
  pub city: String,
  pub postcode: String,
  pub country_code: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub province_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub province_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub company: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone_number: Option<String>,
}

impl Address {
  /// Names of required fields that are blank.
  pub fn blank_fields(&self) -> Vec<&'static str> {
    [
      ("firstName", &self.first_name),
      ("lastName", &self.last_name),
      ("street", &self.street),
      ("city", &self.city),
      ("postcode", &self.postcode),
      ("countryCode", &self.country_code),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect()
  }
}
