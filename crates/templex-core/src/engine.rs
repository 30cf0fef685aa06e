//! Templating pipeline: classification regions, classification, then the
//! regions of the selected class, each dewarped, recognized and parsed.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::classify::{Classification, MrtdResult, PreliminaryResult};
use crate::config::EngineConfig;
use crate::input::DocumentImage;
use crate::ocr::{CropDewarper, Dewarper, OcrEngine, OcrOptions, OcrRequest, OcrResult};
use crate::parsers::{CompiledParser, ParsedValue, Sieve};
use crate::result::TemplatingResult;
use crate::template::{DecodingRegion, TemplatingSettings, DEFAULT_CLASS};

/// Parsers of one group with their shared OCR options.
#[derive(Debug, Clone)]
struct CompiledGroup {
    options: OcrOptions,
    parsers: Vec<CompiledEntry>,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    name: String,
    parser: CompiledParser,
    use_sieve: bool,
}

/// Runs templating settings against documents.
///
/// Settings are frozen when the engine is built: parsers are compiled and
/// each group's OCR options merged once, up front.
pub struct TemplatingEngine<E, D = CropDewarper> {
    settings: TemplatingSettings,
    groups: HashMap<String, CompiledGroup>,
    ocr: E,
    dewarper: D,
    num_threads: usize,
}

impl<E: OcrEngine> TemplatingEngine<E> {
    pub fn new(settings: TemplatingSettings, ocr: E) -> Self {
        Self::with_dewarper(settings, ocr, CropDewarper::new())
    }

    pub fn from_config(settings: TemplatingSettings, ocr: E, config: &EngineConfig) -> Self {
        let dewarper = CropDewarper::new().with_filter(config.resize_filter);
        Self::with_dewarper(settings, ocr, dewarper).with_num_threads(config.num_threads)
    }
}

impl<E: OcrEngine, D: Dewarper> TemplatingEngine<E, D> {
    pub fn with_dewarper(settings: TemplatingSettings, ocr: E, dewarper: D) -> Self {
        let groups = settings
            .registry()
            .iter()
            .filter_map(|(name, specs)| {
                let options = settings.registry().merged_ocr_options(name)?;
                let parsers = specs
                    .iter()
                    .map(|spec| CompiledEntry {
                        name: spec.name.clone(),
                        parser: CompiledParser::compile(spec),
                        use_sieve: spec.uses_sieve(),
                    })
                    .collect();
                Some((name.to_string(), CompiledGroup { options, parsers }))
            })
            .collect();

        Self {
            settings,
            groups,
            ocr,
            dewarper,
            num_threads: 1,
        }
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    pub fn settings(&self) -> &TemplatingSettings {
        &self.settings
    }

    pub fn ocr_engine(&self) -> &E {
        &self.ocr
    }

    /// OCR options used for a group's region.
    pub fn group_options(&self, group: &str) -> Option<&OcrOptions> {
        self.groups.get(group).map(|g| &g.options)
    }

    /// Process one document.
    ///
    /// `mrtd` is the machine readable zone, when the detector read one; a
    /// classifier then sees it instead of the classification region results.
    /// Nothing here fails: missing OCR, unmatched parsers and failed
    /// classification all end up as absent values in the result.
    pub fn process(&self, document: &DocumentImage, mrtd: Option<&MrtdResult>) -> TemplatingResult {
        self.process_with_class(document, mrtd, None)
    }

    /// Like [`TemplatingEngine::process`], but a `known` classification is
    /// reused as is and the classifier does not run.
    pub(crate) fn process_with_class(
        &self,
        document: &DocumentImage,
        mrtd: Option<&MrtdResult>,
        known: Option<&Classification>,
    ) -> TemplatingResult {
        let start = Instant::now();
        let mut result = TemplatingResult::default();

        for region in self.settings.classification_regions() {
            self.extract_region(document, region, &mut result);
        }

        let class = match known {
            Some(classification) => {
                result.set_classification(classification.clone());
                classification.class_name().map(str::to_string)
            }
            None => self.classify(mrtd, &mut result),
        };

        if let Some(class) = class {
            for region in self.settings.regions(&class) {
                self.extract_region(document, region, &mut result);
            }
        }

        info!(
            "Templating finished in {:?}: {} values",
            start.elapsed(),
            result.matched_count()
        );
        result
    }

    /// Run the classifier, if any, and record its outcome. Returns the class
    /// whose regions should be read.
    fn classify(&self, mrtd: Option<&MrtdResult>, result: &mut TemplatingResult) -> Option<String> {
        let Some(classifier) = self.settings.classifier() else {
            return Some(DEFAULT_CLASS.to_string());
        };

        let outcome = {
            let preliminary = match mrtd {
                Some(mrtd) => PreliminaryResult::Mrtd(mrtd),
                None => PreliminaryResult::Templating(result),
            };
            classifier.classify(&preliminary)
        };
        let classification = Classification::from_outcome(outcome);
        let class = classification.class_name().map(str::to_string);
        result.set_classification(classification);

        match &class {
            Some(name) if !self.settings.catalog().contains_class(name) => {
                warn!("Document classified as {} which has no regions", name);
            }
            Some(name) => debug!("Document classified as {}", name),
            None => info!("Document could not be classified"),
        }
        class
    }

    fn extract_region(&self, document: &DocumentImage, region: &DecodingRegion, result: &mut TemplatingResult) {
        let Some(group) = self.groups.get(&region.name) else {
            debug!("Region {} has no parser group", region.name);
            return;
        };

        let ocr = self.recognize(document, region, &group.options);
        let text = ocr.text();
        debug!("Region {} read {} chars", region.name, ocr.char_count());

        for entry in &group.parsers {
            let value = if ocr.is_empty() {
                None
            } else {
                entry.parser.parse(&text)
            };
            debug!(
                "Parser {} in group {}: {}",
                entry.name,
                region.name,
                value.as_ref().map(ParsedValue::as_str).unwrap_or("<no match>")
            );
            result.record(&region.name, &entry.name, value);
        }

        result.set_ocr(&region.name, ocr);
    }

    fn recognize(&self, document: &DocumentImage, region: &DecodingRegion, options: &OcrOptions) -> OcrResult {
        let image = match self.dewarper.dewarp(document, region) {
            Ok(image) => image,
            Err(e) => {
                warn!("Skipping region {}: {}", region.name, e);
                return OcrResult::empty();
            }
        };

        let request = OcrRequest {
            region,
            image: &image,
            options,
            num_threads: self.num_threads,
        };

        self.ocr.recognize(&request).unwrap_or_else(|e| {
            warn!("OCR failed on region {}: {}", region.name, e);
            OcrResult::empty()
        })
    }

    /// `(group, parser)` pairs whose values are combined across frames.
    fn sieved(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups.iter().flat_map(|(group, compiled)| {
            compiled
                .parsers
                .iter()
                .filter(|e| e.use_sieve)
                .map(move |e| (group.as_str(), e.name.as_str()))
        })
    }

    /// Start processing a video stream.
    pub fn video_session(&self, sieve_window: usize) -> VideoSession<'_, E, D> {
        VideoSession {
            engine: self,
            window: sieve_window,
            classification: None,
            sieves: HashMap::new(),
        }
    }

    /// Start processing a video stream with the configured sieve window.
    pub fn video_session_from_config(&self, config: &EngineConfig) -> VideoSession<'_, E, D> {
        self.video_session(config.sieve_window)
    }
}

/// Processes consecutive frames of one document.
///
/// The classifier runs until it names a class; later frames keep that
/// class, so every sieve only sees readings of the same region. Text values
/// of parsers with the sieve enabled are replaced with the consensus of the
/// last frames.
pub struct VideoSession<'e, E, D = CropDewarper> {
    engine: &'e TemplatingEngine<E, D>,
    window: usize,
    classification: Option<Classification>,
    sieves: HashMap<(String, String), Sieve>,
}

impl<E: OcrEngine, D: Dewarper> VideoSession<'_, E, D> {
    pub fn process_frame(&mut self, frame: &DocumentImage, mrtd: Option<&MrtdResult>) -> TemplatingResult {
        let engine = self.engine;
        let mut result = engine.process_with_class(frame, mrtd, self.classification.as_ref());

        if self.classification.is_none() && result.classification().is_classified() {
            self.classification = Some(result.classification().clone());
        }

        for (group, parser) in engine.sieved() {
            let Some(ParsedValue::Text(text)) = result.value_mut(group, parser) else {
                continue;
            };
            let sieve = self
                .sieves
                .entry((group.to_string(), parser.to_string()))
                .or_insert_with(|| Sieve::new(self.window));
            *text = sieve.push(text);
        }

        result
    }

    /// Forget previous frames, e.g. when a new document enters the view.
    pub fn reset(&mut self) {
        self.classification = None;
        self.sieves.clear();
    }

    /// Class kept for the rest of the session, once a frame was classified.
    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }

    pub fn frames_seen(&self) -> usize {
        self.sieves.values().map(Sieve::len).max().unwrap_or(0)
    }
}
