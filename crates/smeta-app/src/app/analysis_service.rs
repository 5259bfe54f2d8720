//! Analysis Service - floor-plan pages to a reconciled building model
//!
//! Workflow of one run:
//! 1. Cap the page list at the configured maximum
//! 2. Extract each page in order, aborting on the first failure
//! 3. Merge page results
//! 4. Validate the merged model
//! 5. Cross-check against the hints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smeta_domain::{merge, validate_analysis, AnalysisConfig, EstimatorOptions, SanityChecker};
use smeta_types::{BuildingAnalysis, Error, Hints, PageResult, Result};
use smeta_vision::{PageExtractor, PageImage, ProgressCallback};
use tracing::{info, info_span, warn};
use uuid::Uuid;

/// Merged model and the sanity warnings raised for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis: BuildingAnalysis,
    pub warnings: Vec<String>,
}

/// Outcome of one run with its bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub pages_analyzed: usize,
    /// Pages dropped by the page cap
    pub pages_ignored: usize,
    pub analysis: BuildingAnalysis,
    pub warnings: Vec<String>,
}

/// Sequences page extraction, merge, validation and sanity check.
///
/// The only component that talks to the vision collaborator. Pages are
/// processed strictly one after another; the first page that fails
/// aborts the run with its 1-based index.
pub struct AnalysisOrchestrator<E> {
    extractor: E,
    checker: SanityChecker,
    config: AnalysisConfig,
    progress: Option<ProgressCallback>,
}

impl<E: PageExtractor> AnalysisOrchestrator<E> {
    /// Create an orchestrator, validating the sanity and analysis options
    pub fn new(extractor: E, options: &EstimatorOptions) -> Result<Self> {
        options.analysis.validate()?;
        let checker = SanityChecker::new(options.sanity.clone())?;
        Ok(Self {
            extractor,
            checker,
            config: options.analysis.clone(),
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    fn notify(&self, msg: &str) {
        if let Some(ref cb) = self.progress {
            cb(msg);
        }
    }

    /// Analyze pages and return the merged model with its warnings
    pub fn run(&self, pages: &[PageImage], hints: Option<&Hints>) -> Result<AnalysisOutcome> {
        if let Some(h) = hints {
            h.validate()?;
        }

        let limit = self.config.max_pages_per_analysis.min(pages.len());
        let pages = &pages[..limit];

        let results = self.extract_pages(pages, hints)?;

        self.notify("Merging page results...");
        let analysis = merge(results)?;
        validate_analysis(&analysis)?;

        let warnings = self.checker.check(&analysis, hints);
        info!(
            rooms = analysis.rooms.len(),
            total_area_m2 = analysis.total_area_m2,
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisOutcome { analysis, warnings })
    }

    /// [`run`](Self::run) wrapped with a run id and timestamp
    pub fn run_report(&self, pages: &[PageImage], hints: Option<&Hints>) -> Result<AnalysisReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", run_id = %run_id);
        let _guard = span.enter();

        let pages_analyzed = self.config.max_pages_per_analysis.min(pages.len());
        let pages_ignored = pages.len() - pages_analyzed;
        if pages_ignored > 0 {
            info!(pages_ignored, "page cap reached, extra pages skipped");
        }

        let outcome = self.run(pages, hints)?;

        Ok(AnalysisReport {
            run_id,
            analyzed_at: Utc::now(),
            pages_analyzed,
            pages_ignored,
            analysis: outcome.analysis,
            warnings: outcome.warnings,
        })
    }

    fn extract_pages(&self, pages: &[PageImage], hints: Option<&Hints>) -> Result<Vec<PageResult>> {
        let total = pages.len();
        pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let index = i + 1;
                self.notify(&format!("Analyzing page {}/{}...", index, total));
                info!(page = index, total, image = %page, "page extraction started");

                match self.extractor.extract(page, hints) {
                    Ok(result) => {
                        info!(page = index, rooms = result.rooms.len(), "page extracted");
                        Ok(result)
                    }
                    Err(Error::SchemaValidation(msg)) => {
                        warn!(page = index, error = %msg, "page result has invalid shape");
                        Err(Error::SchemaValidation(format!("page {}: {}", index, msg)))
                    }
                    Err(e) => {
                        warn!(page = index, error = %e, "page extraction failed");
                        Err(Error::page(index, e))
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smeta_types::Room;
    use std::cell::RefCell;

    /// Replays page results keyed by call order
    struct ScriptedExtractor {
        pages: Vec<Result<PageResult>>,
        calls: RefCell<usize>,
    }

    impl ScriptedExtractor {
        fn new(pages: Vec<Result<PageResult>>) -> Self {
            Self {
                pages,
                calls: RefCell::new(0),
            }
        }
    }

    impl PageExtractor for ScriptedExtractor {
        fn extract(&self, _image: &PageImage, _hints: Option<&Hints>) -> Result<PageResult> {
            let mut calls = self.calls.borrow_mut();
            let i = *calls;
            *calls += 1;
            match self.pages.get(i) {
                Some(Ok(result)) => Ok(result.clone()),
                Some(Err(_)) => Err(Error::EmptyResponse),
                None => Err(Error::Backend("no scripted page".to_string())),
            }
        }
    }

    fn page_result(area: f64) -> PageResult {
        BuildingAnalysis {
            total_area_m2: area,
            ceiling_height_m: None,
            rooms: vec![Room::new("Спальня", 14.0)],
            bathrooms_count: 1,
            notes: None,
        }
    }

    fn images(n: usize) -> Vec<PageImage> {
        (1..=n)
            .map(|i| PageImage::Url(format!("https://cdn.test/p{}.png", i)))
            .collect()
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut options = EstimatorOptions::default();
        options.analysis.max_pages_per_analysis = 0;
        let result = AnalysisOrchestrator::new(ScriptedExtractor::new(vec![]), &options);
        assert!(matches!(result, Err(Error::ThresholdConfig { .. })));
    }

    #[test]
    fn test_page_cap() {
        let extractor = ScriptedExtractor::new((0..7).map(|_| Ok(page_result(50.0))).collect());
        let orchestrator = AnalysisOrchestrator::new(extractor, &EstimatorOptions::default()).unwrap();
        let report = orchestrator.run_report(&images(7), None).unwrap();
        assert_eq!(report.pages_analyzed, 5);
        assert_eq!(report.pages_ignored, 2);
        assert_eq!(*orchestrator.extractor.calls.borrow(), 5);
    }

    #[test]
    fn test_failure_stops_at_first_bad_page() {
        let extractor = ScriptedExtractor::new(vec![
            Ok(page_result(50.0)),
            Err(Error::EmptyResponse),
            Ok(page_result(50.0)),
        ]);
        let orchestrator = AnalysisOrchestrator::new(extractor, &EstimatorOptions::default()).unwrap();
        let err = orchestrator.run(&images(3), None).unwrap_err();
        assert_eq!(err.page_index(), Some(2));
        assert_eq!(*orchestrator.extractor.calls.borrow(), 2);
    }

    #[test]
    fn test_invalid_hints_rejected_before_extraction() {
        let extractor = ScriptedExtractor::new(vec![Ok(page_result(50.0))]);
        let orchestrator = AnalysisOrchestrator::new(extractor, &EstimatorOptions::default()).unwrap();
        let hints = Hints {
            floor_area_m2: 0.0,
            living_rooms_count: 1,
            has_kitchen_living: false,
            bathrooms_count: 1,
            ceiling_height_m: None,
        };
        let err = orchestrator.run(&images(1), Some(&hints)).unwrap_err();
        assert!(matches!(err, Error::InvalidHints(_)));
        assert_eq!(*orchestrator.extractor.calls.borrow(), 0);
    }

    #[test]
    fn test_progress_messages() {
        use std::sync::{Arc, Mutex};

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let extractor = ScriptedExtractor::new(vec![Ok(page_result(50.0)), Ok(page_result(52.0))]);
        let orchestrator = AnalysisOrchestrator::new(extractor, &EstimatorOptions::default())
            .unwrap()
            .with_progress(Box::new(move |msg| sink.lock().unwrap().push(msg.to_string())));

        orchestrator.run(&images(2), None).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], "Analyzing page 1/2...");
        assert_eq!(seen[1], "Analyzing page 2/2...");
    }
}
