use serde::{Deserialize, Serialize};

/// Which closing instruction is appended to the recommendation prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Fertilizer type, amount, cost-efficient methods and organic ideas.
    #[default]
    Detailed,
    /// Short list of suggestions, organic methods and yield tips.
    Concise,
}

impl PromptStyle {
    fn instruction(self) -> &'static str {
        match self {
            PromptStyle::Detailed => {
                "Provide the best type of fertilizer, recommended amount, cost-efficient \
                 farming methods, and simple ideas for using organic fertilizers to enhance \
                 soil health and crop yield."
            }
            PromptStyle::Concise => {
                "Provide fertilizer suggestions, organic methods, and yield optimization tips."
            }
        }
    }
}

/// Build the recommendation prompt sent to the generative model.
///
/// The output depends only on the arguments, so identical inputs always
/// produce byte-identical prompts.
pub fn recommendation_prompt(style: PromptStyle, soil: &str, crop: &str, weather: &str) -> String {
    format!(
        "Based on the following data:\n\
         Soil Health: {soil}\n\
         Crop Type: {crop}\n\
         Weather Patterns: {weather}\n\
         {}",
        style.instruction()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detailed_prompt_layout() {
        let p = recommendation_prompt(PromptStyle::Detailed, "Loamy", "Wheat", "Rainy");
        assert_eq!(
            p,
            "Based on the following data:\n\
             Soil Health: Loamy\n\
             Crop Type: Wheat\n\
             Weather Patterns: Rainy\n\
             Provide the best type of fertilizer, recommended amount, cost-efficient farming \
             methods, and simple ideas for using organic fertilizers to enhance soil health \
             and crop yield."
        );
    }

    #[test]
    fn concise_prompt_differs_only_in_tail() {
        let d = recommendation_prompt(PromptStyle::Detailed, "Sandy", "Corn", "Dry");
        let c = recommendation_prompt(PromptStyle::Concise, "Sandy", "Corn", "Dry");
        let head = "Based on the following data:\nSoil Health: Sandy\nCrop Type: Corn\nWeather Patterns: Dry\n";
        assert!(d.starts_with(head));
        assert!(c.starts_with(head));
        assert!(c.ends_with("yield optimization tips."));
        assert_ne!(d, c);
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = recommendation_prompt(PromptStyle::Concise, "Peaty", "Rice", "Humid");
        let b = recommendation_prompt(PromptStyle::Concise, "Peaty", "Rice", "Humid");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn style_parses_lowercase() {
        let s: PromptStyle = serde_json::from_str("\"concise\"").unwrap();
        assert_eq!(s, PromptStyle::Concise);
        assert_eq!(PromptStyle::default(), PromptStyle::Detailed);
    }
}
