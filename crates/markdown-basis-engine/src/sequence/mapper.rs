use std::ops::Range;

/// One stretch of synthesized text and the source range it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedSegment {
    pub original_start: usize,
    pub original_end: usize,
    /// Bytes this segment contributes to the synthesized text.
    pub replaced_len: usize,
    /// Copied source rather than a replacement. A replacement may have the
    /// same length as its source, as `\r` rewritten to `\n`.
    pub copied: bool,
}

impl MappedSegment {
    pub fn original_range(&self) -> Range<usize> {
        self.original_start..self.original_end
    }

    /// Copied source, as opposed to a replacement.
    pub fn is_original(&self) -> bool {
        self.copied
    }
}

/// Maps offsets in synthesized text back to offsets in the source it was made from.
///
/// Text-synthesizing view operations append segments in output order, so a
/// single mapper can follow several calls whose outputs are concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeMapper {
    segments: Vec<MappedSegment>,
    replaced_len: usize,
}

impl RangeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records source `[start, end)` copied through unchanged.
    pub fn push_original(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        self.replaced_len += end - start;
        if let Some(last) = self.segments.last_mut()
            && last.is_original()
            && last.original_end == start
        {
            last.original_end = end;
            last.replaced_len += end - start;
            return;
        }
        self.segments.push(MappedSegment {
            original_start: start,
            original_end: end,
            replaced_len: end - start,
            copied: true,
        });
    }

    /// Records source `[start, end)` replaced by `replaced_len` synthesized bytes.
    /// An empty source range records pure insertion.
    pub fn push_replacement(&mut self, start: usize, end: usize, replaced_len: usize) {
        if start == end && replaced_len == 0 {
            return;
        }
        self.replaced_len += replaced_len;
        self.segments.push(MappedSegment {
            original_start: start,
            original_end: end,
            replaced_len,
            copied: false,
        });
    }

    /// Source offset of synthesized `index`.
    ///
    /// Copied segments map one to one; every byte of a replacement maps to the
    /// start of the range it replaced. Indices at or past the end map to the
    /// end of the last segment, and an empty mapper maps everything to 0.
    pub fn original_offset(&self, index: usize) -> usize {
        let mut pos = 0;
        for segment in &self.segments {
            if index < pos + segment.replaced_len {
                return if segment.is_original() {
                    segment.original_start + (index - pos)
                } else {
                    segment.original_start
                };
            }
            pos += segment.replaced_len;
        }
        self.segments.last().map_or(0, |s| s.original_end)
    }

    /// Source range covering synthesized `[start, end)`.
    pub fn original_range(&self, start: usize, end: usize) -> Range<usize> {
        let original_start = self.original_offset(start);
        if start >= end {
            return original_start..original_start;
        }
        // end of the segment holding the last synthesized byte
        let last = end - 1;
        let mut pos = 0;
        for segment in &self.segments {
            if last < pos + segment.replaced_len {
                let original_end = if segment.is_original() {
                    segment.original_start + (last - pos) + 1
                } else {
                    segment.original_end
                };
                return original_start..original_end;
            }
            pos += segment.replaced_len;
        }
        original_start..self.original_offset(end)
    }

    /// Length of the synthesized text recorded so far.
    pub fn replaced_len(&self) -> usize {
        self.replaced_len
    }

    pub fn segments(&self) -> &[MappedSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.replaced_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// "a&amp;b" (source offsets 10..17) synthesized as "a&b"
    fn entity_mapper() -> RangeMapper {
        let mut mapper = RangeMapper::new();
        mapper.push_original(10, 11);
        mapper.push_replacement(11, 16, 1);
        mapper.push_original(16, 17);
        mapper
    }

    #[test]
    fn test_maps_copied_and_replaced_bytes() {
        let mapper = entity_mapper();
        assert_eq!(mapper.replaced_len(), 3);
        assert_eq!(mapper.original_offset(0), 10);
        assert_eq!(mapper.original_offset(1), 11);
        assert_eq!(mapper.original_offset(2), 16);
        assert_eq!(mapper.original_offset(3), 17);
        assert_eq!(mapper.original_offset(42), 17);
    }

    #[test]
    fn test_ranges_cover_whole_replacements() {
        let mapper = entity_mapper();
        assert_eq!(mapper.original_range(1, 2), 11..16);
        assert_eq!(mapper.original_range(0, 3), 10..17);
        assert_eq!(mapper.original_range(0, 1), 10..11);
        assert_eq!(mapper.original_range(2, 2), 16..16);
    }

    #[test]
    fn test_adjacent_copies_merge() {
        let mut mapper = RangeMapper::new();
        mapper.push_original(0, 3);
        mapper.push_original(3, 5);
        mapper.push_original(7, 8);
        assert_eq!(
            mapper.segments(),
            &[
                MappedSegment {
                    original_start: 0,
                    original_end: 5,
                    replaced_len: 5,
                    copied: true,
                },
                MappedSegment {
                    original_start: 7,
                    original_end: 8,
                    replaced_len: 1,
                    copied: true,
                },
            ]
        );
        assert_eq!(mapper.original_offset(5), 7);
    }

    #[test]
    fn test_same_length_replacement_stays_a_replacement() {
        // "a\rb" synthesized as "a\nb"
        let mut mapper = RangeMapper::new();
        mapper.push_original(0, 1);
        mapper.push_replacement(1, 2, 1);
        mapper.push_original(2, 3);
        let kinds: Vec<bool> = mapper.segments().iter().map(MappedSegment::is_original).collect();
        assert_eq!(kinds, vec![true, false, true]);
        assert_eq!(mapper.original_range(1, 3), 1..3);
        assert_eq!(mapper.original_offset(2), 2);
    }

    #[test]
    fn test_insertion_maps_to_its_anchor() {
        let mut mapper = RangeMapper::new();
        mapper.push_original(0, 3);
        mapper.push_replacement(3, 3, 1);
        assert_eq!(mapper.original_offset(3), 3);
        assert_eq!(mapper.original_offset(4), 3);
    }

    #[test]
    fn test_empty_and_cleared_mappers() {
        let mut mapper = entity_mapper();
        assert!(!mapper.is_empty());
        mapper.clear();
        assert!(mapper.is_empty());
        assert_eq!(mapper.replaced_len(), 0);
        assert_eq!(mapper.original_offset(5), 0);
    }
}
