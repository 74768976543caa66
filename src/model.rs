use serde::{Deserialize, Serialize};

/// One suggested recipe, as returned to callers and rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub time: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tips: String,
}

/// Suggested file name for the plain-text download.
pub const PLAIN_TEXT_FILE_NAME: &str = "jaldikhana-recipes.txt";

/// Render recipes as a plain-text document, one block per recipe.
pub fn recipes_to_plain_text(recipes: &[Recipe]) -> String {
    recipes
        .iter()
        .map(|r| {
            let mut lines = vec![format!("# {}", r.title), format!("Time: {}", r.time)];
            lines.push(String::new());
            lines.push("Ingredients:".to_string());
            lines.extend(r.ingredients.iter().map(|i| format!("- {}", i)));
            lines.push(String::new());
            lines.push("Steps:".to_string());
            lines.extend(
                r.steps
                    .iter()
                    .enumerate()
                    .map(|(n, s)| format!("{}. {}", n + 1, s)),
            );
            lines.push(String::new());
            lines.push(format!("Tips: {}", r.tips));
            lines.push("---".to_string());
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dal_rice() -> Recipe {
        Recipe {
            title: "Dal Rice".to_string(),
            time: "20 mins".to_string(),
            ingredients: vec!["rice".to_string(), "dal".to_string()],
            steps: vec!["Cook rice".to_string(), "Cook dal".to_string()],
            tips: "Add ghee".to_string(),
        }
    }

    #[test]
    fn test_plain_text_layout() {
        let text = recipes_to_plain_text(&[dal_rice()]);
        let expected = "# Dal Rice\nTime: 20 mins\n\nIngredients:\n- rice\n- dal\n\nSteps:\n1. Cook rice\n2. Cook dal\n\nTips: Add ghee\n---";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_plain_text_separates_recipes() {
        let mut second = dal_rice();
        second.title = "Jeera Rice".to_string();
        let text = recipes_to_plain_text(&[dal_rice(), second]);
        assert!(text.contains("---\n\n# Jeera Rice"));
    }

    #[test]
    fn test_plain_text_empty() {
        assert_eq!(recipes_to_plain_text(&[]), "");
    }

    #[test]
    fn test_deserialize_without_tips() {
        let json = r#"{"title":"X","time":"5 mins","ingredients":[],"steps":["b"]}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.tips, "");
    }
}
