/// Image-generation prompt for a portrait book cover.
///
/// `scene` is the one-sentence cover description from the generated book;
/// when it is blank the title stands in for it.
pub fn cover_prompt(scene: &str, title: &str) -> String {
    let scene = scene.trim();
    let subject = if scene.is_empty() { title.trim() } else { scene };
    format!(
        "Book cover illustration, portrait orientation, for a novel titled \"{title}\". \
         Scene: {subject}. Painterly, cinematic lighting, rich color, strong central \
         composition. No text, letters, or typography anywhere in the image.",
        title = title.trim(),
    )
}
