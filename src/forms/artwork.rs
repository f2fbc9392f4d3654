use reqwest::multipart::Form;

use super::ImageUpload;
use crate::error::Result;
use crate::models::Artwork;
use crate::validation::{self, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkDraft {
    pub title: String,
    pub description: String,
    pub quantity_available: i64,
    pub price: String,
    pub image: Option<ImageUpload>,
}

impl Default for ArtworkDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            quantity_available: 1,
            price: "0.00".to_string(),
            image: None,
        }
    }
}

impl ArtworkDraft {
    pub fn from_artwork(artwork: &Artwork) -> Self {
        Self {
            title: artwork.title.clone(),
            description: artwork.description.clone(),
            quantity_available: i64::from(artwork.quantity_available),
            price: artwork.price.clone(),
            image: None,
        }
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new()
            .text("title", self.title.trim().to_string())
            .text("description", self.description.clone())
            .text("quantity_available", self.quantity_available.to_string())
            .text("price", self.price.trim().to_string());
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(form)
    }
}

impl Validate for ArtworkDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::min_length(&mut errors, "title", &self.title, 3);
        validation::require(&mut errors, "description", &self.description);
        validation::non_negative(&mut errors, "quantity_available", self.quantity_available);
        validation::decimal_price(&mut errors, "price", &self.price);
        if let Some(image) = &self.image {
            image.check(&mut errors, "image");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_title_and_negative_quantity() {
        let draft = ArtworkDraft {
            title: "Ab".to_string(),
            description: "Oil on canvas".to_string(),
            quantity_available: -2,
            price: "250.00".to_string(),
            image: None,
        };
        let err = draft.validate().unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.first("title"), Some("Must be at least 3 characters."));
        assert!(errors.contains("quantity_available"));
    }
}
