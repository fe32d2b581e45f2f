//! Greedy prefix packing of ranked memories under a character budget.

use memoria_types::memory::Memory;

/// Default context budget in characters.
pub const DEFAULT_CONTEXT_BUDGET_CHARS: usize = 1200;

/// Render one memory as a context line: `- [category] content\n`.
pub fn render_line(memory: &Memory) -> String {
    format!("- [{}] {}\n", memory.category, memory.content)
}

/// Pack memories, in the order given, into at most `budget_chars` characters.
///
/// Stops at the first line that would overflow the budget; later (possibly
/// shorter) lines are not tried. Lines are never truncated. The caller owns
/// the ranking. Length is counted in `char`s so CJK facts are not penalized
/// for their UTF-8 width.
pub fn build_budgeted_context(memories: &[Memory], budget_chars: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;

    for memory in memories {
        let line = render_line(memory);
        let len = line.chars().count();
        if used + len > budget_chars {
            break;
        }
        used += len;
        out.push_str(&line);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoria_types::memory::MemoryCategory;
    use uuid::Uuid;

    fn mem(content: &str, category: MemoryCategory) -> Memory {
        Memory::new(Uuid::nil(), content, category, 5, None)
    }

    #[test]
    fn renders_category_and_content() {
        let m = mem("likes black coffee", MemoryCategory::Preference);
        assert_eq!(render_line(&m), "- [preference] likes black coffee\n");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(build_budgeted_context(&[], 1200), "");
    }

    #[test]
    fn everything_fits() {
        let facts = vec![
            mem("lives in Berlin", MemoryCategory::Fact),
            mem("prefers short answers", MemoryCategory::Preference),
        ];
        let out = build_budgeted_context(&facts, 1200);
        assert_eq!(
            out,
            "- [fact] lives in Berlin\n- [preference] prefers short answers\n"
        );
    }

    #[test]
    fn stops_before_overflowing_line() {
        // Each line is "- [fact] xxxxxxxxxx\n" = 20 chars.
        let facts = vec![
            mem("aaaaaaaaaa", MemoryCategory::Fact),
            mem("bbbbbbbbbb", MemoryCategory::Fact),
            mem("cccccccccc", MemoryCategory::Fact),
        ];
        let out = build_budgeted_context(&facts, 45);
        assert_eq!(out, "- [fact] aaaaaaaaaa\n- [fact] bbbbbbbbbb\n");
    }

    #[test]
    fn exact_fit_is_included() {
        let facts = vec![mem("aaaaaaaaaa", MemoryCategory::Fact)];
        assert_eq!(build_budgeted_context(&facts, 20).chars().count(), 20);
        assert_eq!(build_budgeted_context(&facts, 19), "");
    }

    #[test]
    fn does_not_skip_ahead_to_shorter_facts() {
        let long = "x".repeat(100);
        let facts = vec![
            mem("short", MemoryCategory::Fact),
            mem(&long, MemoryCategory::Fact),
            mem("tiny", MemoryCategory::Fact),
        ];
        let out = build_budgeted_context(&facts, 50);
        assert_eq!(out, "- [fact] short\n");
    }

    #[test]
    fn counts_characters_not_bytes() {
        // "- [fact] " (9) + 10 CJK chars + "\n" (1) = 20 chars, 40 bytes.
        let facts = vec![mem("喜欢黑咖啡喜欢黑咖啡", MemoryCategory::Fact)];
        let out = build_budgeted_context(&facts, 20);
        assert_eq!(out.chars().count(), 20);
    }

    #[test]
    fn output_is_bounded_and_a_line_prefix() {
        let facts: Vec<Memory> = (0..200)
            .map(|i| mem(&format!("fact number {i} {}", "y".repeat(i % 37)), MemoryCategory::Context))
            .collect();
        let full: String = facts.iter().map(render_line).collect();

        for budget in [0, 1, 25, 300, 1199, 1200, 5000] {
            let out = build_budgeted_context(&facts, budget);
            assert!(out.chars().count() <= budget);
            assert!(full.starts_with(&out));
            assert!(out.is_empty() || out.ends_with('\n'));
        }
    }
}
