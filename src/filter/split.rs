//! Splits filter file content into rule blocks.
//!
//! Blocks are separated by blank (or whitespace-only) lines. `//` comments
//! are stripped from the text handed to the compiler, while the verbatim
//! text is kept for diagnostics.

/// One blank-line-delimited block of a filter file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Section {
    /// Block text with comments stripped; this is what compiles. Every
    /// line keeps its trailing newline.
    pub text: String,
    /// Verbatim block text with the final newline trimmed, for diagnostics.
    pub raw: String,
    /// 1-based line number of the block's first line.
    pub start_line: usize,
}

/// Strip a `//` comment from one line. The marker is not string-aware, so
/// a `//` inside a quoted literal also truncates the line.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

struct Block {
    stripped: String,
    raw: String,
    start_line: usize,
}

impl Block {
    fn starting_at(line: usize) -> Block {
        Block {
            stripped: String::new(),
            raw: String::new(),
            start_line: line,
        }
    }

    fn push(&mut self, line: &str) {
        self.stripped.push_str(strip_comment(line));
        self.stripped.push('\n');
        self.raw.push_str(line);
        self.raw.push('\n');
    }

    fn flush_into(mut self, sections: &mut Vec<Section>) {
        // comment-only blocks have nothing to compile and are dropped
        if self.stripped.trim().is_empty() {
            return;
        }
        // only the raw form loses its final newline
        if self.raw.ends_with('\n') {
            self.raw.pop();
        }
        sections.push(Section {
            text: self.stripped,
            raw: self.raw,
            start_line: self.start_line,
        });
    }
}

/// Split file content into sections. Consecutive separators produce no
/// empty sections, and a final block is flushed whether or not the file
/// ends with a newline.
pub(crate) fn split_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut block: Option<Block> = None;

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some(done) = block.take() {
                done.flush_into(&mut sections);
            }
            continue;
        }
        block
            .get_or_insert_with(|| Block::starting_at(idx + 1))
            .push(line);
    }
    if let Some(done) = block.take() {
        done.flush_into(&mut sections);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(content: &str) -> Vec<usize> {
        split_sections(content).iter().map(|s| s.start_line).collect()
    }

    #[test]
    fn blocks_start_at_expected_lines() {
        let sections = split_sections("A\n\nB\n\nC");
        assert_eq!(sections.len(), 3);
        assert_eq!(lines_of("A\n\nB\n\nC"), vec![1, 3, 5]);
        assert_eq!(sections[0].text, "A\n");
        assert_eq!(sections[2].text, "C\n");
    }

    #[test]
    fn consecutive_separators_produce_no_empty_blocks() {
        assert_eq!(lines_of("A\n\n\n\nB\n"), vec![1, 5]);
    }

    #[test]
    fn whitespace_only_lines_separate_blocks() {
        assert_eq!(lines_of("A\n \t \nB"), vec![1, 3]);
    }

    #[test]
    fn leading_blank_lines_shift_the_first_block() {
        assert_eq!(lines_of("\n\nA"), vec![3]);
    }

    #[test]
    fn final_block_is_flushed_without_trailing_newline() {
        let sections = split_sections("A\n\nB");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].text, "B\n");
    }

    #[test]
    fn every_text_line_keeps_its_newline_raw_drops_the_last() {
        let sections = split_sections("A\nB\n");
        assert_eq!(sections[0].text, "A\nB\n");
        assert_eq!(sections[0].raw, "A\nB");
    }

    #[test]
    fn multi_line_block_keeps_its_lines_together() {
        let sections = split_sections("Rarity == Unique\n&& ItemLevel > 60\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "Rarity == Unique\n&& ItemLevel > 60\n");
        assert_eq!(sections[0].raw, "Rarity == Unique\n&& ItemLevel > 60");
        assert_eq!(sections[0].start_line, 1);
    }

    #[test]
    fn comments_are_stripped_from_text_but_kept_in_raw() {
        let sections = split_sections("StackSize >= 5 // stackables\n");
        assert_eq!(sections[0].text, "StackSize >= 5 \n");
        assert_eq!(sections[0].raw, "StackSize >= 5 // stackables");
    }

    #[test]
    fn comment_only_block_is_dropped() {
        let sections = split_sections("// currency below\n// (edit freely)\n\nIsCorrupted\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start_line, 4);
        assert_eq!(sections[0].text, "IsCorrupted\n");
    }

    #[test]
    fn leading_comment_line_is_part_of_the_block() {
        let sections = split_sections("// pick this up\nIsCorrupted\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start_line, 1);
        assert_eq!(sections[0].text, "\nIsCorrupted\n");
    }

    #[test]
    fn comment_marker_inside_string_still_truncates() {
        let sections = split_sections(r#"BaseName == "x // y""#);
        assert_eq!(sections[0].text, "BaseName == \"x \n");
    }

    #[test]
    fn empty_and_blank_files_have_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n  \n").is_empty());
    }
}
