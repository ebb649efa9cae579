use validator::{Validate, ValidationErrors};

use crate::utils::error::{AppError, FieldError};

/// Runs the request's declarative rules, turning failures into `AppError::Validation`
pub fn validate_body<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(AppError::from)
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let param = field.to_string();
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", param));
                    FieldError::body(&param, &msg)
                })
            })
            .collect();

        // field_errors() is a HashMap
        fields.sort_by(|a, b| a.param.cmp(&b.param));
        AppError::Validation(fields)
    }
}
