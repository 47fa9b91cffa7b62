// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* content and a [link](https://example.com).\n\n- Bullet point\n  - Nested item\n- [x] Another item\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n| a | b |\n|:--|--:|\n| 1 | 2 |\n\n> [!NOTE]\n> Quoted $x^2$ text.\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_nested_lists(items: usize, depth: usize) -> String {
    let mut content = String::new();
    for item in 0..items {
        for level in 0..depth {
            let indent = "  ".repeat(level);
            content.push_str(&format!("{indent}- item {item} at level {level}\n"));
        }
    }
    content
}

#[allow(dead_code)]
pub fn generate_reference_heavy(links: usize) -> String {
    let mut content = String::new();
    for i in 0..links {
        content.push_str(&format!("See [link {i}][r{i}] and note [^n{i}].\n"));
    }
    content.push('\n');
    for i in 0..links {
        content.push_str(&format!("[r{i}]: https://example.com/{i} \"Title {i}\"\n"));
        content.push_str(&format!("[^n{i}]: Footnote {i}.\n"));
    }
    content
}

#[allow(dead_code)]
pub fn generate_formula(terms: usize) -> String {
    (0..terms)
        .map(|i| format!(r"\frac{{a_{i}}}{{{i} + b^2}}"))
        .collect::<Vec<_>>()
        .join(" + ")
}
