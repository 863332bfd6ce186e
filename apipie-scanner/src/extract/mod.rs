//! Pattern extractors.
//!
//! Every JavaScript extractor is an independent [`Extractor`] that scans raw
//! text and returns the [`Hit`]s it recognises. Nothing here parses
//! JavaScript: unmatched or mangled input simply yields fewer hits, and the
//! same call may be reported by several extractors. Duplicates are merged
//! later by the endpoint store.

pub mod angular;
pub mod axios;
pub mod fetch;
pub mod graphql;
pub mod html;
pub mod jquery;
pub mod paths;
pub mod rpc;
pub mod superagent;
pub mod xhr;

use crate::model::Hit;

/// A text-to-hits pattern module.
pub trait Extractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, js: &str) -> Vec<Hit>;
}

/// Ordered collection of extractors run over every script body.
pub struct ExtractorSet {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorSet {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn with(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Run every extractor and concatenate their hits in registration order.
    pub fn extract_all(&self, js: &str) -> Vec<Hit> {
        self.extractors
            .iter()
            .flat_map(|extractor| extractor.extract(js))
            .collect()
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::empty()
            .with(fetch::FetchExtractor)
            .with(axios::AxiosExtractor)
            .with(xhr::XhrExtractor)
            .with(jquery::JqueryExtractor)
            .with(angular::AngularExtractor)
            .with(superagent::SuperagentExtractor)
            .with(paths::PathExtractor)
            .with(graphql::GraphqlExtractor)
            .with(rpc::RpcExtractor)
    }
}
