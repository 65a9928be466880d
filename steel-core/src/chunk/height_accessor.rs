//! Vertical bounds of a level or chunk.

/// Anything with a vertical build range.
///
/// `max_y` is inclusive. Derived values saturate, so extreme ranges never
/// overflow.
pub trait LevelHeightAccessor {
    /// Number of buildable layers.
    fn height(&self) -> i32;

    /// Lowest buildable y.
    fn min_y(&self) -> i32;

    /// Highest buildable y.
    fn max_y(&self) -> i32 {
        self.min_y().saturating_add(self.height()).saturating_sub(1)
    }

    /// Section y of the lowest section.
    fn min_section_y(&self) -> i32 {
        self.min_y() >> 4
    }

    /// Section y of the highest section.
    fn max_section_y(&self) -> i32 {
        self.max_y() >> 4
    }

    /// Number of sections in the range.
    fn section_count(&self) -> i32 {
        self.max_section_y() - self.min_section_y() + 1
    }

    /// Whether `y` lies in the build range.
    fn is_inside_build_height(&self, y: i32) -> bool {
        y >= self.min_y() && y <= self.max_y()
    }

    /// Whether `y` lies outside the build range.
    fn is_outside_build_height(&self, y: i32) -> bool {
        !self.is_inside_build_height(y)
    }

    /// Index of the section holding `y`, counted from the lowest section.
    fn section_index(&self, y: i32) -> i32 {
        self.section_index_from_section_y(y >> 4)
    }

    /// Index of the section with section y `section_y`.
    fn section_index_from_section_y(&self, section_y: i32) -> i32 {
        section_y - self.min_section_y()
    }

    /// Section y of the section at `index`.
    fn section_y_from_section_index(&self, index: i32) -> i32 {
        index + self.min_section_y()
    }

    /// `y` clamped into the build range.
    fn clamp_y(&self, y: i32) -> i32 {
        let min_y = self.min_y();
        let max_y = self.max_y();
        if max_y < min_y { min_y } else { y.clamp(min_y, max_y) }
    }
}

/// A plain height range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightRange {
    /// Lowest y.
    pub min_y: i32,
    /// Number of blocks above `min_y`.
    pub height: i32,
}

impl HeightRange {
    /// A range of `height` blocks starting at `min_y`.
    #[must_use]
    pub const fn new(min_y: i32, height: i32) -> Self {
        Self { min_y, height }
    }
}

impl LevelHeightAccessor for HeightRange {
    fn height(&self) -> i32 {
        self.height
    }

    fn min_y(&self) -> i32 {
        self.min_y
    }
}

/// The vertical range surface rules resolve anchors against: the overlap of
/// the level and the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldGenerationContext {
    min_gen_y: i32,
    gen_depth: i32,
}

impl WorldGenerationContext {
    /// The overlap of the level range and the generator range.
    #[must_use]
    pub fn new(level: &impl LevelHeightAccessor, generator_min_y: i32, generator_depth: i32) -> Self {
        Self {
            min_gen_y: level.min_y().max(generator_min_y),
            gen_depth: level.height().min(generator_depth),
        }
    }

    /// Lowest y of the overlap.
    #[must_use]
    pub const fn min_gen_y(&self) -> i32 {
        self.min_gen_y
    }

    /// Height of the overlap.
    #[must_use]
    pub const fn gen_depth(&self) -> i32 {
        self.gen_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overworld_range() {
        let range = HeightRange::new(-64, 384);
        assert_eq!(range.max_y(), 319);
        assert_eq!(range.min_section_y(), -4);
        assert_eq!(range.max_section_y(), 19);
        assert_eq!(range.section_count(), 24);
        assert_eq!(range.section_index(-64), 0);
        assert_eq!(range.section_index(319), 23);
        assert_eq!(range.section_y_from_section_index(4), 0);
        assert!(range.is_inside_build_height(-64));
        assert!(range.is_outside_build_height(320));
    }

    #[test]
    fn clamp_y_saturates() {
        let range = HeightRange::new(-64, 384);
        assert_eq!(range.clamp_y(i32::MIN), -64);
        assert_eq!(range.clamp_y(i32::MAX), 319);
        assert_eq!(range.clamp_y(70), 70);

        let huge = HeightRange::new(i32::MAX - 10, 100);
        assert_eq!(huge.max_y(), i32::MAX - 1);
        assert_eq!(huge.clamp_y(i32::MAX), i32::MAX - 1);
        assert_eq!(huge.clamp_y(0), i32::MAX - 10);
    }

    #[test]
    fn generation_context_is_the_overlap() {
        let level = HeightRange::new(-64, 384);
        let context = WorldGenerationContext::new(&level, 0, 256);
        assert_eq!(context.min_gen_y(), 0);
        assert_eq!(context.gen_depth(), 256);
    }
}
