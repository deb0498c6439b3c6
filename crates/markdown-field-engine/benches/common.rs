// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **some** content.\n\n- Bullet point\n- Another item\n\n";
    base.repeat(size)
}

/// An ordered list long enough to make renumbering measurable
#[allow(dead_code)]
pub fn generate_ordered_list(items: usize) -> String {
    (1..=items)
        .map(|n| format!("{n}. item number {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}
