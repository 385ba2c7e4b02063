//! Company details printed on invoices.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Length of an Indian GSTIN.
pub const GST_NUMBER_LEN: usize = 15;

/// The singleton company record.
///
/// Every field defaults to an empty string so a fresh installation can
/// render invoices before settings are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub gst_number: String,
}

impl CompanyDetails {
    /// Trim every field and check the GST number shape.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Validation`] if a non-empty GST number is not
    /// exactly 15 ASCII alphanumerics.
    pub fn normalized(self) -> Result<Self, OrderError> {
        let details = Self {
            name: self.name.trim().to_owned(),
            address: self.address.trim().to_owned(),
            mobile: self.mobile.trim().to_owned(),
            gst_number: self.gst_number.trim().to_ascii_uppercase(),
        };

        let gst = &details.gst_number;
        if !gst.is_empty()
            && (gst.len() != GST_NUMBER_LEN || !gst.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(OrderError::validation(format!(
                "GST number must be {GST_NUMBER_LEN} letters or digits"
            )));
        }
        Ok(details)
    }
}
