//! Two-phase text measurement.
//!
//! Layout code never measures text inline. Components that own labels implement
//! [`MeasurementTargetProvider`]; a [`MeasurementBatcher`] collects every target
//! for the pass and only [`MeasurementBatcher::flush`] produces the
//! [`Measurements`] that geometry code is allowed to read. Holding a
//! `Measurements` value is the proof that the barrier has been crossed.

use crate::geometry::Size;
use crate::viz::text::{estimate_text_width_px, line_height_px};
use ahash::AHashMap;

/// Identifies one measured text within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeasureId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRequest {
    pub id: MeasureId,
    pub text: String,
    pub font_px: u32,
}

/// Implemented by components that own text needing a size before layout.
pub trait MeasurementTargetProvider {
    fn collect_measurement_targets(&self) -> Vec<MeasureRequest>;
}

/// Text shaping backend.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_px: u32) -> Size;
}

/// Character-count estimate; good enough for SVG output where the viewer shapes text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure(&self, text: &str, font_px: u32) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let lines: Vec<&str> = text.lines().collect();
        let width = lines
            .iter()
            .map(|l| estimate_text_width_px(l, font_px))
            .fold(0.0, f64::max);
        Size::new(width, lines.len() as f64 * line_height_px(font_px))
    }
}

/// Result of a flush: sizes keyed by request id.
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    sizes: AHashMap<MeasureId, Size>,
}

impl Measurements {
    pub fn get(&self, id: MeasureId) -> Option<Size> {
        self.sizes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Collects measurement requests from providers and resolves them in one batch.
pub struct MeasurementBatcher {
    measurer: Box<dyn TextMeasurer>,
    pending: Vec<MeasureRequest>,
    flushes: usize,
}

impl Default for MeasurementBatcher {
    fn default() -> Self {
        Self::new(Box::new(HeuristicMeasurer))
    }
}

impl MeasurementBatcher {
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            measurer,
            pending: Vec::new(),
            flushes: 0,
        }
    }

    /// Queue every target of `provider`.
    pub fn collect(&mut self, provider: &dyn MeasurementTargetProvider) {
        let targets = provider.collect_measurement_targets();
        log::trace!("measurement batch: collected {} targets", targets.len());
        self.pending.extend(targets);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of completed flushes, useful to verify a pass measured once.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Measure everything collected so far and clear the queue.
    pub fn flush(&mut self) -> Measurements {
        let mut sizes = AHashMap::with_capacity(self.pending.len());
        for req in self.pending.drain(..) {
            let size = self.measurer.measure(&req.text, req.font_px);
            sizes.insert(req.id, size);
        }
        self.flushes += 1;
        Measurements { sizes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<MeasureRequest>);

    impl MeasurementTargetProvider for Fixed {
        fn collect_measurement_targets(&self) -> Vec<MeasureRequest> {
            self.0.clone()
        }
    }

    #[test]
    fn flush_resolves_all_collected_targets() {
        let mut batcher = MeasurementBatcher::default();
        let provider = Fixed(vec![
            MeasureRequest {
                id: MeasureId(1),
                text: "+12".into(),
                font_px: 12,
            },
            MeasureRequest {
                id: MeasureId(2),
                text: "two\nlines".into(),
                font_px: 10,
            },
        ]);
        batcher.collect(&provider);
        assert_eq!(batcher.pending(), 2);
        let m = batcher.flush();
        assert_eq!(batcher.pending(), 0);
        assert_eq!(batcher.flush_count(), 1);
        assert_eq!(m.len(), 2);
        let two = m.get(MeasureId(2)).unwrap();
        assert_eq!(two.height, 2.0 * line_height_px(10));
        assert!(m.get(MeasureId(3)).is_none());
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(HeuristicMeasurer.measure("", 12), Size::ZERO);
    }
}
