use chrono::NaiveDateTime;
use reqwest::multipart::Form;

use super::{format_datetime, ImageUpload};
use crate::error::Result;
use crate::models::{Level, Workshop};
use crate::validation::{self, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopDraft {
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub location: String,
    pub capacity: i64,
    pub price: String,
    pub level: Level,
    pub duration: String,
    pub materials_provided: String,
    pub instructor: String,
    pub image: Option<ImageUpload>,
}

impl Default for WorkshopDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            start_date: None,
            end_date: None,
            location: String::new(),
            capacity: 0,
            price: "0.00".to_string(),
            level: Level::Beginner,
            duration: String::new(),
            materials_provided: String::new(),
            instructor: String::new(),
            image: None,
        }
    }
}

impl WorkshopDraft {
    pub fn from_workshop(workshop: &Workshop) -> Self {
        Self {
            title: workshop.title.clone(),
            description: workshop.description.clone(),
            start_date: Some(workshop.start_date.naive_utc()),
            end_date: Some(workshop.end_date.naive_utc()),
            location: workshop.location.clone(),
            capacity: i64::from(workshop.capacity),
            price: workshop.price.clone(),
            level: workshop.level,
            duration: workshop.duration.clone(),
            materials_provided: workshop.materials_provided.clone(),
            instructor: workshop.instructor.clone(),
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
            .text("price", self.price.trim().to_string())
            .text("level", self.level.as_str())
            .text("duration", self.duration.trim().to_string())
            .text("materials_provided", self.materials_provided.clone())
            .text("instructor", self.instructor.trim().to_string());
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(form)
    }
}

impl Validate for WorkshopDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::min_length(&mut errors, "title", &self.title, 3);
        validation::require(&mut errors, "description", &self.description);
        validation::require(&mut errors, "location", &self.location);
        validation::require(&mut errors, "instructor", &self.instructor);
        validation::date_range(&mut errors, self.start_date, self.end_date);
        validation::non_negative(&mut errors, "capacity", self.capacity);
        validation::decimal_price(&mut errors, "price", &self.price);
        validation::duration(&mut errors, "duration", &self.duration);
        if let Some(image) = &self.image {
            image.check(&mut errors, "image");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::parse_datetime_local;

    #[test]
    fn workshop_requires_instructor_and_duration() {
        let draft = WorkshopDraft {
            title: "Watercolor basics".to_string(),
            description: "Intro session".to_string(),
            start_date: Some(parse_datetime_local("2025-07-01T10:00").unwrap()),
            end_date: Some(parse_datetime_local("2025-07-01T12:00").unwrap()),
            location: "Studio B".to_string(),
            capacity: 12,
            price: "40".to_string(),
            ..WorkshopDraft::default()
        };
        let err = draft.validate().unwrap_err();
        let errors = err.field_errors().unwrap();
        assert!(errors.contains("instructor"));
        assert!(errors.contains("duration"));
        assert_eq!(errors.len(), 2);

        let fixed = WorkshopDraft {
            instructor: "M. Duval".to_string(),
            duration: "02:00:00".to_string(),
            level: Level::Advanced,
            ..draft
        };
        assert!(fixed.validate().is_ok());
    }
}
