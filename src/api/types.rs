use std::sync::Arc;

use crate::pipeline::LesionAnalyzer;

/// Shared state handed to every handler: the assembled pipeline, read-only
/// for the process lifetime.
#[derive(Clone)]
pub struct ApiContext {
    pub analyzer: Arc<LesionAnalyzer>,
}

impl ApiContext {
    pub fn new(analyzer: Arc<LesionAnalyzer>) -> Self {
        Self { analyzer }
    }
}
