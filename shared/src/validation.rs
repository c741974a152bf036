//! Validation utilities for batch drafts
//!
//! An invalid draft is the only error a farmer ever sees from the save path,
//! so every violation names its field and carries a Bangla message.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::BatchDraft;

/// A draft field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct DraftViolation {
    pub field: &'static str,
    pub message: &'static str,
    pub message_bn: &'static str,
}

impl DraftViolation {
    fn new(field: &'static str, message: &'static str, message_bn: &'static str) -> Self {
        Self {
            field,
            message,
            message_bn,
        }
    }
}

/// Validate that a required text field is present
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field is required");
    }
    Ok(())
}

/// Validate batch weight is positive
pub fn validate_weight(weight_kg: Decimal) -> Result<(), &'static str> {
    if weight_kg <= Decimal::ZERO {
        return Err("Weight must be greater than zero");
    }
    Ok(())
}

/// Validate moisture content is a percentage
pub fn validate_moisture_content(moisture: Decimal) -> Result<(), &'static str> {
    if moisture < Decimal::ZERO || moisture > Decimal::from(100) {
        return Err("Moisture content must be between 0 and 100%");
    }
    Ok(())
}

/// Validate the harvest did not happen in the future
pub fn validate_harvest_date(harvest_date: NaiveDate, today: NaiveDate) -> Result<(), &'static str> {
    if harvest_date > today {
        return Err("Harvest date cannot be in the future");
    }
    Ok(())
}

/// Validate a batch draft, reporting the first violation
pub fn validate_batch_draft(draft: &BatchDraft, today: NaiveDate) -> Result<(), DraftViolation> {
    validate_required(&draft.crop_type).map_err(|message| {
        DraftViolation::new("cropType", message, "ফসলের ধরন দিতে হবে")
    })?;

    validate_weight(draft.weight_kg).map_err(|message| {
        DraftViolation::new("weightKg", message, "ওজন শূন্যের বেশি হতে হবে")
    })?;

    validate_harvest_date(draft.harvest_date, today).map_err(|message| {
        DraftViolation::new("harvestDate", message, "ফসল তোলার তারিখ ভবিষ্যতের হতে পারে না")
    })?;

    validate_required(&draft.storage_location).map_err(|message| {
        DraftViolation::new("storageLocation", message, "সংরক্ষণের স্থান দিতে হবে")
    })?;

    validate_required(&draft.storage_type).map_err(|message| {
        DraftViolation::new("storageType", message, "সংরক্ষণের ধরন দিতে হবে")
    })?;

    if let Some(moisture) = draft.moisture_content {
        validate_moisture_content(moisture).map_err(|message| {
            DraftViolation::new("moistureContent", message, "আর্দ্রতা ০ থেকে ১০০% এর মধ্যে হতে হবে")
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn draft() -> BatchDraft {
        BatchDraft {
            crop_type: "Paddy".to_string(),
            weight_kg: Decimal::from(800),
            harvest_date: NaiveDate::from_ymd_opt(2024, 5, 8).unwrap(),
            storage_location: "Mymensingh".to_string(),
            storage_type: "Jute Bags".to_string(),
            moisture_content: Some(Decimal::from(18)),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_batch_draft(&draft(), today()).is_ok());
    }

    #[test]
    fn test_missing_crop_type() {
        let mut d = draft();
        d.crop_type = "   ".to_string();
        let err = validate_batch_draft(&d, today()).unwrap_err();
        assert_eq!(err.field, "cropType");
    }

    #[test]
    fn test_zero_weight() {
        let mut d = draft();
        d.weight_kg = Decimal::ZERO;
        assert_eq!(validate_batch_draft(&d, today()).unwrap_err().field, "weightKg");
    }

    #[test]
    fn test_future_harvest_date() {
        let mut d = draft();
        d.harvest_date = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        assert_eq!(validate_batch_draft(&d, today()).unwrap_err().field, "harvestDate");
    }

    #[test]
    fn test_moisture_out_of_range() {
        let mut d = draft();
        d.moisture_content = Some(Decimal::from(101));
        assert_eq!(validate_batch_draft(&d, today()).unwrap_err().field, "moistureContent");

        d.moisture_content = None;
        assert!(validate_batch_draft(&d, today()).is_ok());
    }

    #[test]
    fn test_violation_display() {
        let mut d = draft();
        d.storage_type = String::new();
        let err = validate_batch_draft(&d, today()).unwrap_err();
        assert_eq!(err.to_string(), "storageType: Field is required");
    }
}
