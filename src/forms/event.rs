use chrono::NaiveDateTime;
use reqwest::multipart::Form;
use serde::Serialize;

use super::{format_datetime, ImageUpload};
use crate::error::Result;
use crate::models::Event;
use crate::validation::{self, FieldErrors, Validate};

/// Editable fields of an event
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub location: String,
    pub capacity: i64,
    pub price: String,
    pub image: Option<ImageUpload>,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            start_date: None,
            end_date: None,
            location: String::new(),
            capacity: 0,
            price: "0.00".to_string(),
            image: None,
        }
    }
}

impl EventDraft {
    /// Prefill from an existing event; the stored image is kept unless replaced
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: Some(event.start_date.naive_utc()),
            end_date: Some(event.end_date.naive_utc()),
            location: event.location.clone(),
            capacity: i64::from(event.capacity),
            price: event.price.clone(),
            image: None,
        }
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new()
            .text("title", self.title.trim().to_string())
            .text("description", self.description.clone())
            .text("start_date", format_datetime(self.start_date))
            .text("end_date", format_datetime(self.end_date))
            .text("location", self.location.trim().to_string())
            .text("capacity", self.capacity.to_string())
            .text("price", self.price.trim().to_string());
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(form)
    }
}

impl Validate for EventDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::min_length(&mut errors, "title", &self.title, 3);
        validation::require(&mut errors, "description", &self.description);
        validation::require(&mut errors, "location", &self.location);
        validation::date_range(&mut errors, self.start_date, self.end_date);
        validation::non_negative(&mut errors, "capacity", self.capacity);
        validation::decimal_price(&mut errors, "price", &self.price);
        if let Some(image) = &self.image {
            image.check(&mut errors, "image");
        }
        errors.into_result()
    }
}

/// Star rating left on an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingDraft {
    pub value: u8,
    pub comment: String,
}

impl Default for RatingDraft {
    fn default() -> Self {
        Self {
            value: 5,
            comment: String::new(),
        }
    }
}

impl Validate for RatingDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if !(1..=5).contains(&self.value) {
            errors.add("value", "Rating must be between 1 and 5.");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::validation::parse_datetime_local;

    fn valid() -> EventDraft {
        EventDraft {
            title: "Vernissage".to_string(),
            description: "Opening night".to_string(),
            start_date: Some(parse_datetime_local("2025-06-01T18:00").unwrap()),
            end_date: Some(parse_datetime_local("2025-06-01T22:00").unwrap()),
            location: "Main hall".to_string(),
            capacity: 80,
            price: "15.00".to_string(),
            image: None,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn start_after_end_is_an_end_date_error() {
        let mut draft = valid();
        draft.start_date = Some(parse_datetime_local("2025-06-02T18:00").unwrap());
        match draft.validate() {
            Err(Error::Validation(errors)) => {
                assert_eq!(
                    errors.first("end_date"),
                    Some("End date must be after the start date.")
                );
                assert_eq!(errors.len(), 1);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn empty_draft_reports_every_required_field() {
        let err = EventDraft::default().validate().unwrap_err();
        let errors = err.field_errors().unwrap();
        for field in ["title", "description", "location", "start_date", "end_date"] {
            assert!(errors.contains(field), "missing error for {}", field);
        }
        assert!(!errors.contains("price"));
    }

    #[test]
    fn negative_capacity_rejected() {
        let mut draft = valid();
        draft.capacity = -1;
        let err = draft.validate().unwrap_err();
        assert!(err.field_errors().unwrap().contains("capacity"));
    }

    #[test]
    fn rating_bounds() {
        assert!(RatingDraft::default().validate().is_ok());
        let zero = RatingDraft {
            value: 0,
            comment: String::new(),
        };
        assert!(zero.validate().is_err());
        let six = RatingDraft {
            value: 6,
            comment: "great".to_string(),
        };
        assert!(six.validate().is_err());
    }
}
