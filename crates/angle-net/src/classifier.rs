//! Angle classification pipeline

use crate::angle::{AngleLabel, AngleResult, ANGLE_CLASSES};
use crate::config::ClassifierConfig;
use crate::decoder::decode;
use crate::model::ModelLoader;
use crate::preprocess::Preprocessor;
use crate::session::{InferenceSession, OrtSession, SessionOptions};
use crate::smoother::{smooth, Smoothing};
use crate::AngleError;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

/// Text line orientation classifier
///
/// Owns one inference session. `classify` takes `&mut self`; use one
/// classifier per worker thread for parallel throughput.
#[derive(Debug)]
pub struct AngleClassifier<S: InferenceSession = OrtSession> {
    session: S,
    preprocessor: Preprocessor,
}

impl AngleClassifier<OrtSession> {
    /// Load the configured model and build an ONNX Runtime backed classifier
    pub fn new(config: &ClassifierConfig, loader: &impl ModelLoader) -> Result<Self, AngleError> {
        config.validate()?;
        let blob = loader.load(&config.model_name)?;
        let session = OrtSession::from_blob(&blob, &SessionOptions::from(config))?;
        Self::with_session(config, session)
    }
}

impl<S: InferenceSession> AngleClassifier<S> {
    /// Create a classifier around an existing session
    pub fn with_session(config: &ClassifierConfig, session: S) -> Result<Self, AngleError> {
        config.validate()?;
        info!(
            "Creating angle classifier: input={}x{}, channels={}, resize={:?}",
            config.target_width,
            config.target_height,
            config.channels(),
            config.resize_mode
        );

        Ok(Self {
            session,
            preprocessor: Preprocessor::from_config(config),
        })
    }

    /// Classify a batch of text line crops
    ///
    /// With `do_angle` unset every image gets an unclassified result and the
    /// model is never run. With both `do_angle` and `most_angle` set the batch
    /// is smoothed to its majority label. Any failure aborts the whole batch.
    pub fn classify(
        &mut self,
        images: &[DynamicImage],
        do_angle: bool,
        most_angle: bool,
    ) -> Result<Vec<AngleResult>, AngleError> {
        if !do_angle {
            return Ok(vec![AngleResult::unclassified(); images.len()]);
        }

        let start = Instant::now();
        let results = images
            .iter()
            .map(|image| self.classify_one(image))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Classified {} text lines in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(smooth(results, Smoothing::from_flags(do_angle, most_angle)))
    }

    /// Preprocess, run and decode a single image
    pub fn classify_one(&mut self, image: &DynamicImage) -> Result<AngleResult, AngleError> {
        let start = Instant::now();

        let input = self.preprocessor.run(image)?;
        let scores = self.session.infer(input)?;
        if scores.len() != ANGLE_CLASSES {
            return Err(AngleError::OutputShape {
                expected: ANGLE_CLASSES,
                actual: scores.len(),
            });
        }

        let (index, confidence) = decode(&scores);
        let label = AngleLabel::from_index(index).ok_or(AngleError::OutputShape {
            expected: ANGLE_CLASSES,
            actual: scores.len(),
        })?;
        let elapsed = start.elapsed();

        debug!(
            "Angle {:?} (score={:.3}) for {}x{} crop in {}us",
            label,
            confidence,
            image.width(),
            image.height(),
            elapsed.as_micros()
        );

        Ok(AngleResult::new(label, confidence, elapsed))
    }

    pub fn session(&self) -> &S {
        &self.session
    }
}
