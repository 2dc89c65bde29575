// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\nParagraph with \\*escaped\\* text &amp; entities.\r\n\n- [x] Done item\n- [ ] Open item\n  - [ ] Nested item\n- Plain item\n\n```rust\nfn example() {\n\tprintln!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_task_lists(lists: usize, items: usize) -> String {
    let mut content = String::new();
    for list in 0..lists {
        content.push_str(&format!("## List {}\n\n", list));
        for item in 0..items {
            let state = if item % 3 == 0 { "x" } else { " " };
            content.push_str(&format!("- [{}] Task {} of list {}\n", state, item, list));
            if item % 4 == 0 {
                content.push_str(&format!("  + [ ] Follow-up for {}\n", item));
            }
        }
        content.push('\n');
    }
    content
}
