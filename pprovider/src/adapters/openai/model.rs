//! Catalog of supported OpenAI chat models and their context windows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenAiModel {
    pub alias: &'static str,
    pub name: &'static str,
    pub context_window: usize,
}

const CATALOG: [OpenAiModel; 6] = [
    OpenAiModel {
        alias: "gpt3Turbo",
        name: "gpt-3.5-turbo",
        context_window: 4_000,
    },
    OpenAiModel {
        alias: "gpt3TurboBig",
        name: "gpt-3.5-turbo-16k",
        context_window: 16_000,
    },
    OpenAiModel {
        alias: "gpt4",
        name: "gpt-4-0613",
        context_window: 8_000,
    },
    OpenAiModel {
        alias: "gpt4Big",
        name: "gpt-4-32k",
        context_window: 32_000,
    },
    OpenAiModel {
        alias: "gpt4Turbo",
        name: "gpt-4-1106-preview",
        context_window: 128_000,
    },
    OpenAiModel {
        alias: "gpt4Vision",
        name: "gpt-4-vision-preview",
        context_window: 128_000,
    },
];

impl OpenAiModel {
    pub fn catalog() -> &'static [OpenAiModel] {
        &CATALOG
    }

    pub fn from_alias(alias: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|model| model.alias == alias)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|model| model.name == name)
    }

    pub fn aliases() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|model| model.alias)
    }

    pub fn is_valid_alias(alias: &str) -> bool {
        Self::from_alias(alias).is_some() && alias.to_ascii_lowercase().contains("gpt")
    }
}

impl Default for OpenAiModel {
    fn default() -> Self {
        CATALOG[2]
    }
}

#[cfg(test)]
mod tests {
    use super::OpenAiModel;

    #[test]
    fn default_model_is_gpt4() {
        let model = OpenAiModel::default();
        assert_eq!(model.alias, "gpt4");
        assert_eq!(model.name, "gpt-4-0613");
        assert_eq!(model.context_window, 8_000);
    }

    #[test]
    fn aliases_resolve_to_catalog_entries() {
        assert_eq!(
            OpenAiModel::from_alias("gpt4Turbo").map(|model| model.name),
            Some("gpt-4-1106-preview")
        );
        assert_eq!(
            OpenAiModel::from_name("gpt-3.5-turbo-16k").map(|model| model.context_window),
            Some(16_000)
        );
        assert_eq!(OpenAiModel::aliases().count(), 6);
    }

    #[test]
    fn unknown_aliases_are_rejected() {
        assert!(OpenAiModel::is_valid_alias("gpt3Turbo"));
        assert!(!OpenAiModel::is_valid_alias("gpt5"));
        assert!(!OpenAiModel::is_valid_alias("claude"));
        assert!(!OpenAiModel::is_valid_alias(""));
    }
}
