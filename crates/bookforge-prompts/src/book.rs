use bookforge_core::parse::Section;

pub const MIN_CHAPTERS: usize = 3;
pub const MAX_CHAPTERS: usize = 5;

/// Build the text-generation prompt for a story idea.
///
/// The output-format line is assembled from `Section`, the same type the
/// parser reads, so the tags asked for are the tags expected.
pub fn book_prompt(idea: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "Act as a master novelist. Your task is to take the following idea \
         and expand it into a short, complete book.\n\n",
    );
    prompt.push_str("## Idea\n\n");
    prompt.push_str(&quote(idea.trim()));
    prompt.push_str("\n\n");
    append_instructions(&mut prompt);
    prompt
}

fn append_instructions(prompt: &mut String) {
    prompt.push_str("## Instructions\n\n");
    prompt.push_str("1. **Title:** Create an attractive, relevant title.\n");
    prompt.push_str(
        "2. **Cover:** Describe, in a single sentence, a visually striking \
         scene for the cover.\n",
    );
    prompt.push_str(&format!(
        "3. **Content:** Write the book divided into {MIN_CHAPTERS} to {MAX_CHAPTERS} \
         chapters, each starting with a Markdown heading that carries its title.\n"
    ));
    prompt.push_str(
        "4. **Output format:** Return the result EXACTLY in the following format, \
         with nothing before or after it:\n\n",
    );
    prompt.push_str(&output_format());
    prompt.push('\n');
}

/// `[TITLE]...[/TITLE][COVER_PROMPT]...[/COVER_PROMPT][CONTENT]...[/CONTENT]`
pub fn output_format() -> String {
    Section::ALL
        .iter()
        .map(|s| format!("{}...{}", s.open(), s.close()))
        .collect()
}

/// Quote the idea as a Markdown block so multi-line ideas stay contained.
fn quote(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
