//! Mock Lookups
//!
//! For testing and offline demos. Returns fixed outputs and records which
//! lookup ran.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Number;

use super::{DocumentLookup, WeatherLookup, WebLookup};
use crate::capability::{DOCUMENT_SEARCH, GET_WEATHER, WEB_SEARCH};
use crate::error::Result;

/// Fixed-output implementation of every lookup trait
pub struct MockLookups {
    documents: String,
    web: String,
    temperature: Number,
    calls: Mutex<Vec<&'static str>>,
}

impl Default for MockLookups {
    fn default() -> Self {
        Self {
            documents: "[]".into(),
            web: r#"{"webPages":{"value":[]}}"#.into(),
            temperature: Number::from(20),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockLookups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(mut self, output: impl Into<String>) -> Self {
        self.documents = output.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Number) -> Self {
        self.temperature = temperature;
        self
    }

    /// Capability names in the order they were invoked
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(name);
    }
}

#[async_trait]
impl DocumentLookup for MockLookups {
    async fn search(&self, _query: &str) -> Result<String> {
        self.record(DOCUMENT_SEARCH);
        Ok(self.documents.clone())
    }
}

#[async_trait]
impl WebLookup for MockLookups {
    async fn search(&self, _query: &str) -> Result<String> {
        self.record(WEB_SEARCH);
        Ok(self.web.clone())
    }
}

#[async_trait]
impl WeatherLookup for MockLookups {
    async fn current_temperature(&self, _latitude: f64, _longitude: f64) -> Result<Number> {
        self.record(GET_WEATHER);
        Ok(self.temperature.clone())
    }
}
