use std::collections::BTreeMap;

/// Render bookkeeping of the section compositor.
///
/// Failures are kept per section index and follow the renumbering when a
/// section is removed, so a section that never renders is easy to spot.
#[derive(Debug, Default)]
pub struct RenderMetrics {
    background_passes: usize,
    rendered: usize,
    failures: BTreeMap<usize, usize>,
}

/// Point-in-time copy of [`RenderMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSnapshot {
    pub background_passes: usize,
    pub rendered: usize,
    pub skipped: usize,
    pub failing_sections: usize,
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A full background recompute started.
    pub fn begin_background(&mut self) {
        self.background_passes += 1;
    }

    /// One render of `section`; `produced` is false when it had to be skipped.
    pub fn record(&mut self, section: usize, produced: bool) {
        self.rendered += 1;
        if !produced {
            *self.failures.entry(section).or_default() += 1;
        }
    }

    pub fn failures_for(&self, section: usize) -> usize {
        self.failures.get(&section).copied().unwrap_or(0)
    }

    /// Drops the failures of `index` and shifts the sections behind it down by one.
    pub fn section_removed(&mut self, index: usize) {
        let tail = self.failures.split_off(&index);
        self.failures.extend(
            tail.into_iter()
                .filter(|(section, _)| *section != index)
                .map(|(section, count)| (section - 1, count)),
        );
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            background_passes: self.background_passes,
            rendered: self.rendered,
            skipped: self.failures.values().sum(),
            failing_sections: self.failures.len(),
        }
    }
}
