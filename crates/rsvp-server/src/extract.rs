//! Form body extraction.
//!
//! Browsers may repeat a field; the first value wins, as with
//! `FormData.get`. A body that cannot be read as a urlencoded form is a
//! server-side failure answered with "Internal server error".

use std::collections::HashSet;

use axum::extract::{FromRequest, Request};
use axum::Form;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Message for form bodies that cannot be parsed.
pub const UNREADABLE_FORM: &str = "Internal server error";

/// A urlencoded form keeping the first value of each repeated field.
#[derive(Debug, Clone)]
pub struct FormData<T>(pub T);

/// Drop every pair whose name already appeared earlier.
pub fn first_values(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter(|(name, _)| seen.insert(name.clone()))
        .collect()
}

fn unreadable(err: &dyn std::error::Error) -> AppError {
    tracing::warn!(error = %err, "unreadable form body");
    AppError::Internal(UNREADABLE_FORM.to_owned())
}

impl<S, T> FromRequest<S> for FormData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
            .await
            .map_err(|e| unreadable(&e))?;

        let encoded = serde_urlencoded::to_string(first_values(pairs)).map_err(|e| unreadable(&e))?;
        serde_urlencoded::from_str(&encoded)
            .map(Self)
            .map_err(|e| unreadable(&e))
    }
}
