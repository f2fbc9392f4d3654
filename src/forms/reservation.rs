use serde::Serialize;

use crate::error::Result;
use crate::models::{Artwork, Id};
use crate::validation::{self, FieldErrors, Validate};

/// Customer contact details and quantity for a reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

impl Default for ReservationDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            quantity: 1,
            notes: None,
        }
    }
}

/// Body of `POST /api/reservations/`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReservationPayload {
    pub artwork: Id,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReservationDraft {
    /// Contact checks plus `1 <= quantity <= artwork.quantity_available`
    pub fn validate_for(&self, artwork: &Artwork) -> Result<()> {
        let mut errors = self.contact_errors();
        if self.quantity < 1 {
            errors.add("quantity", "Quantity must be at least 1.");
        } else if self.quantity > i64::from(artwork.quantity_available) {
            errors.add(
                "quantity",
                format!(
                    "Only {} available for '{}'.",
                    artwork.quantity_available, artwork.title
                ),
            );
        }
        errors.into_result()
    }

    /// Validated payload ready to send
    pub fn to_payload(&self, artwork: &Artwork) -> Result<ReservationPayload> {
        self.validate_for(artwork)?;
        Ok(ReservationPayload {
            artwork: artwork.id,
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            // bounded above by a u32
            quantity: self.quantity as u32,
            notes: self
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }

    fn contact_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        validation::require(&mut errors, "full_name", &self.full_name);
        validation::email(&mut errors, "email", &self.email);
        validation::require(&mut errors, "phone", &self.phone);
        validation::require(&mut errors, "address", &self.address);
        errors
    }
}

/// Validates the contact fields only; use [`ReservationDraft::validate_for`]
/// once the artwork is known.
impl Validate for ReservationDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = self.contact_errors();
        if self.quantity < 1 {
            errors.add("quantity", "Quantity must be at least 1.");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork(available: u32) -> Artwork {
        Artwork {
            id: 9,
            title: "Blue Study".to_string(),
            description: String::new(),
            quantity_available: available,
            price: "120.00".to_string(),
            image: None,
            color_palette: None,
            created_at: None,
        }
    }

    fn draft(quantity: i64) -> ReservationDraft {
        ReservationDraft {
            full_name: "Camille Roy".to_string(),
            email: "camille@example.com".to_string(),
            phone: "0601020304".to_string(),
            address: "3 rue des Arts".to_string(),
            quantity,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn quantity_above_availability_is_blocked() {
        let err = draft(3).validate_for(&artwork(2)).unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().first("quantity"),
            Some("Only 2 available for 'Blue Study'.")
        );
    }

    #[test]
    fn payload_uses_artwork_id_and_drops_blank_notes() {
        let payload = draft(2).to_payload(&artwork(2)).unwrap();
        assert_eq!(payload.artwork, 9);
        assert_eq!(payload.quantity, 2);
        assert_eq!(payload.notes, None);
    }

    #[test]
    fn zero_quantity_and_bad_email() {
        let mut d = draft(0);
        d.email = "nope".to_string();
        let err = d.validate().unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.contains("quantity"));
        assert!(errors.contains("email"));
    }
}
