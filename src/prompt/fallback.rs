use super::*;
use rand::seq::SliceRandom;

/// Built-in prompt banks. Serves every round when no API key is configured
/// and backs up the live provider when it errors. Never fails.
pub struct StaticPrompts;

struct Bank {
    category: &'static str,
    base: &'static str,
    variants: &'static [&'static str],
}

const BANKS: &[Bank] = &[
    Bank {
        category: "opinion",
        base: "What's your go-to midnight snack?",
        variants: &[
            "What's a midnight snack that gives you the ick?",
            "What snack do you avoid before bed?",
            "What's the worst late-night craving you've had?",
            "What's a snack you regret eating at night?",
            "What food keeps you up at night?",
        ],
    },
    Bank {
        category: "sensory",
        base: "What's a sound that instantly relaxes you?",
        variants: &[
            "What's a sound that instantly annoys you?",
            "What's a sound you can't fall asleep to?",
            "What's the most startling sound you know?",
            "What noise would you ban forever?",
            "What's a sound that makes you tense up?",
        ],
    },
    Bank {
        category: "cultural",
        base: "What movie could you rewatch forever?",
        variants: &[
            "What movie do you never want to see again?",
            "What movie did everyone love but you?",
            "What movie did you walk out of?",
            "What's the most overrated film you've seen?",
            "What movie put you to sleep?",
        ],
    },
    Bank {
        category: "player-based",
        base: "Which player here would survive longest in the wilderness?",
        variants: &[
            "Which player here would get lost in a supermarket?",
            "Which player here would tap out of camping first?",
            "Which player here is most likely to befriend a bear?",
            "Which player here would eat the mystery berries?",
            "Which player here would call a taxi from the woods?",
        ],
    },
];

impl StaticPrompts {
    /// Draw a prompt set from the banks. Infallible, so callers can lean on
    /// it as the last line of fallback.
    pub fn pick(category: &str, impostor_count: usize) -> PromptSet {
        let bank = BANKS
            .iter()
            .find(|b| b.category == category)
            .unwrap_or(&BANKS[0]);

        let mut shuffled: Vec<String> = bank.variants.iter().map(|v| v.to_string()).collect();
        shuffled.shuffle(&mut rand::rng());
        shuffled.truncate(impostor_count);

        PromptSet {
            base: bank.base.to_string(),
            variants: shuffled,
        }
    }
}

#[async_trait]
impl PromptProvider for StaticPrompts {
    async fn generate(&self, category: &str, impostor_count: usize) -> PromptResult<PromptSet> {
        Ok(Self::pick(category, impostor_count))
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_fills_requested_variants() {
        let set = StaticPrompts.generate("opinion", 3).await.unwrap();
        assert!(!set.base.is_empty());
        assert_eq!(set.variants.len(), 3);
        // Variants are distinct draws from the bank
        let unique: std::collections::HashSet<_> = set.variants.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_caps_at_bank_size() {
        let set = StaticPrompts.generate("sensory", 50).await.unwrap();
        assert_eq!(set.variants.len(), 5);
    }

    #[tokio::test]
    async fn test_unknown_category_falls_back_to_first_bank() {
        let set = StaticPrompts.generate("nonsense", 1).await.unwrap();
        assert_eq!(set.base, "What's your go-to midnight snack?");
    }

    #[tokio::test]
    async fn test_zero_impostors_yields_no_variants() {
        let set = StaticPrompts.generate("cultural", 0).await.unwrap();
        assert!(set.variants.is_empty());
    }
}
