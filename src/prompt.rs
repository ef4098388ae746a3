//! Prompt assembly.

use crate::request::Style;

/// Appends ` in {style}` to the prompt unless the style is [`Style::None`].
pub fn assemble(raw_prompt: &str, style: Style) -> String {
    match style {
        Style::None => raw_prompt.to_string(),
        style => format!("{raw_prompt} in {style}"),
    }
}

/// Weighted prompt syntax (eg `sunset:1.5`) is accepted by the form but not
/// interpreted; the prompt goes through unchanged either way.
pub fn apply_weights(prompt: String, _use_weights: bool) -> String {
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_is_appended() {
        for style in Style::ALL.into_iter().filter(|style| *style != Style::None) {
            assert_eq!(
                assemble("a red fox", style),
                format!("a red fox in {}", style.label())
            );
        }
    }

    #[test]
    fn mystical_forest_in_fantasy_art() {
        assert_eq!(
            assemble("a mystical forest", Style::FantasyArt),
            "a mystical forest in fantasy art"
        );
    }

    #[test]
    fn none_style_passes_through() {
        assert_eq!(assemble("a mystical forest", Style::None), "a mystical forest");
    }

    #[test]
    fn assemble_is_repeatable() {
        let first = assemble("neon alley", Style::Cyberpunk);
        let second = assemble("neon alley", Style::Cyberpunk);
        assert_eq!(first, second);
    }

    #[test]
    fn weights_do_not_change_the_prompt() {
        assert_eq!(apply_weights("sunset:1.5".to_string(), true), "sunset:1.5");
        assert_eq!(apply_weights("sunset:1.5".to_string(), false), "sunset:1.5");
    }
}
