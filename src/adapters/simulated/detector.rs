use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::DetectorPort;
use crate::domain::{
    errors::{DomainError, DomainResult},
    model::{DetectorParams, DetectorVariant},
    scan::{CapturedImage, Sightings},
    theme::SimulatedVocabulary,
};

pub const SIGHTINGS_PER_RUN: RangeInclusive<usize> = 1..=5;
pub const AESTHETIC_CONFIDENCE: RangeInclusive<f32> = 0.70..=0.99;

/// Sortea entre 1 y 5 etiquetas con reemplazo y una confianza decorativa.
pub fn simulate<R: Rng>(rng: &mut R, vocabulary: &SimulatedVocabulary) -> Sightings {
    let pool = vocabulary.labels();
    let k = rng.gen_range(SIGHTINGS_PER_RUN);
    let labels = (0..k)
        .map(|_| pool[rng.gen_range(0..pool.len())].clone())
        .collect();
    let confidence = rng.gen_range(AESTHETIC_CONFIDENCE);
    Sightings::Simulated { labels, confidence }
}

/// Espectrómetro de mentira: no mira la imagen, sólo espera y sortea.
pub struct SimulatedDetector {
    vocabulary: SimulatedVocabulary,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedDetector {
    pub fn new(vocabulary: SimulatedVocabulary, delay: Duration) -> Self {
        Self::with_rng(vocabulary, delay, StdRng::from_entropy())
    }

    pub fn with_seed(vocabulary: SimulatedVocabulary, delay: Duration, seed: u64) -> Self {
        Self::with_rng(vocabulary, delay, StdRng::seed_from_u64(seed))
    }

    fn with_rng(vocabulary: SimulatedVocabulary, delay: Duration, rng: StdRng) -> Self {
        Self { vocabulary, delay, rng: Mutex::new(rng) }
    }
}

#[async_trait]
impl DetectorPort for SimulatedDetector {
    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Simulated
    }

    async fn detect(&self, image: &CapturedImage, _params: &DetectorParams) -> DomainResult<Sightings> {
        debug!("Simulando rastreo sobre {} bytes", image.bytes.len());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DomainError::DetectorUnavailable("generador aleatorio envenenado".into()))?;
        Ok(simulate(&mut *rng, &self.vocabulary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_run_stays_within_bounds() {
        let vocab = SimulatedVocabulary::default();
        let mut rng = StdRng::seed_from_u64(31);
        let mut seen_sizes = std::collections::HashSet::new();

        for _ in 0..500 {
            let Sightings::Simulated { labels, confidence } = simulate(&mut rng, &vocab) else {
                panic!("expected simulated sightings");
            };
            assert!(SIGHTINGS_PER_RUN.contains(&labels.len()));
            assert!(labels.iter().all(|l| vocab.contains(l)));
            assert!((0.70..=0.99).contains(&confidence));
            seen_sizes.insert(labels.len());
        }
        assert_eq!(seen_sizes.len(), 5);
    }

    #[test]
    fn single_label_vocabulary_always_repeats_it() {
        let vocab = SimulatedVocabulary::new(vec!["Niebla".into()]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let Sightings::Simulated { labels, .. } = simulate(&mut rng, &vocab) else {
            panic!("expected simulated sightings");
        };
        assert!(labels.iter().all(|l| l == "Niebla"));
    }

    #[tokio::test]
    async fn detector_ignores_image_contents() {
        let det = SimulatedDetector::with_seed(SimulatedVocabulary::default(), Duration::ZERO, 3);
        let image = CapturedImage::new(b"no soy un jpeg".to_vec());
        let out = det.detect(&image, &DetectorParams::default()).await.unwrap();
        assert!(matches!(out, Sightings::Simulated { .. }));
        assert_eq!(det.variant(), DetectorVariant::Simulated);
    }

    #[tokio::test(start_paused = true)]
    async fn detector_waits_the_configured_delay() {
        let det = SimulatedDetector::with_seed(SimulatedVocabulary::default(), Duration::from_millis(1200), 3);
        let started = tokio::time::Instant::now();
        det.detect(&CapturedImage::new(vec![1]), &DetectorParams::default()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1200));
    }
}
