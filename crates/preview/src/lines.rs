use std::sync::Arc;

/// A file's content split on `\n`.
///
/// Splitting follows `str::split('\n')`: empty content is one empty line and
/// a trailing newline yields a trailing empty line. A `\r` before the newline
/// stays part of the line; use [`LineModel::display_line`] to drop it.
///
/// Clones share the underlying buffer.
#[derive(Debug, Clone)]
pub struct LineModel {
    content: Arc<str>,
    starts: Arc<[usize]>,
}

impl LineModel {
    pub fn new(content: impl Into<Arc<str>>) -> Self {
        let content: Arc<str> = content.into();
        let starts: Arc<[usize]> = std::iter::once(0)
            .chain(
                content
                    .bytes()
                    .enumerate()
                    .filter(|(_, byte)| *byte == b'\n')
                    .map(|(idx, _)| idx + 1),
            )
            .collect();

        Self { content, starts }
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line(&self, idx: usize) -> Option<&str> {
        let start = *self.starts.get(idx)?;
        let end = match self.starts.get(idx + 1) {
            Some(next_start) => next_start - 1,
            None => self.content.len(),
        };
        Some(&self.content[start..end])
    }

    /// The line without a trailing `\r`.
    pub fn display_line(&self, idx: usize) -> Option<&str> {
        self.line(idx).map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.line_count()).filter_map(|idx| self.line(idx))
    }

    /// Whether both models are handles to the same buffer.
    pub fn same_content(&self, other: &LineModel) -> bool {
        Arc::ptr_eq(&self.content, &other.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_matches_split() {
        let samples = [
            "",
            "\n",
            "one",
            "one\n",
            "Line 1\nLine 2\nLine 3\nLine 4\nLine 5",
            "\n\n\n",
            "a\r\nb\r\n",
            "tail without newline\nx",
        ];
        for sample in samples {
            let model = LineModel::new(sample);
            assert_eq!(model.line_count(), sample.split('\n').count(), "{sample:?}");
            let collected: Vec<_> = model.lines().collect();
            let expected: Vec<_> = sample.split('\n').collect();
            assert_eq!(collected, expected);
        }
    }

    #[test]
    fn empty_content_is_one_empty_line() {
        let model = LineModel::new("");
        assert_eq!(model.line_count(), 1);
        assert_eq!(model.line(0), Some(""));
        assert_eq!(model.line(1), None);
    }

    #[test]
    fn random_access() {
        let model = LineModel::new("Line 1\nLine 2\nLine 3\nLine 4\nLine 5");
        assert_eq!(model.line_count(), 5);
        assert_eq!(model.line(0), Some("Line 1"));
        assert_eq!(model.line(4), Some("Line 5"));
        assert_eq!(model.line(5), None);
    }

    #[test]
    fn carriage_returns_are_kept_in_the_model() {
        let model = LineModel::new("a\r\nb");
        assert_eq!(model.line(0), Some("a\r"));
        assert_eq!(model.display_line(0), Some("a"));
        assert_eq!(model.display_line(1), Some("b"));
    }

    #[test]
    fn multibyte_content() {
        let model = LineModel::new("héllo\n世界\n");
        assert_eq!(model.line(1), Some("世界"));
        assert_eq!(model.line(2), Some(""));
    }

    #[test]
    fn clones_share_buffer() {
        let model = LineModel::new("x\ny");
        let clone = model.clone();
        assert!(std::ptr::eq(model.content(), clone.content()));
        assert!(model.same_content(&clone));
        assert!(!model.same_content(&LineModel::new("x\ny")));
    }
}
