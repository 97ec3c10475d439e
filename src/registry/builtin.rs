use super::{ApiProtocol, ProviderDefinition};

/// Built-in providers, in resolution order.
pub static BUILTIN_PROVIDERS: &[ProviderDefinition] = &[
    ProviderDefinition {
        name: "anthropic",
        env_key_candidates: &["ANTHROPIC_API_KEY"],
        base_url: "https://api.anthropic.com",
        api: ApiProtocol::AnthropicMessages,
    },
    ProviderDefinition {
        name: "openai",
        env_key_candidates: &["OPENAI_API_KEY"],
        base_url: "https://api.openai.com/v1",
        api: ApiProtocol::OpenaiResponses,
    },
    ProviderDefinition {
        name: "google",
        env_key_candidates: &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        base_url: "https://generativelanguage.googleapis.com/v1beta",
        api: ApiProtocol::GoogleGenerativeAi,
    },
    ProviderDefinition {
        name: "openrouter",
        env_key_candidates: &["OPENROUTER_API_KEY"],
        base_url: "https://openrouter.ai/api/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "groq",
        env_key_candidates: &["GROQ_API_KEY"],
        base_url: "https://api.groq.com/openai/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "mistral",
        env_key_candidates: &["MISTRAL_API_KEY"],
        base_url: "https://api.mistral.ai/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "xai",
        env_key_candidates: &["XAI_API_KEY"],
        base_url: "https://api.x.ai/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "deepseek",
        env_key_candidates: &["DEEPSEEK_API_KEY"],
        base_url: "https://api.deepseek.com",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "cerebras",
        env_key_candidates: &["CEREBRAS_API_KEY"],
        base_url: "https://api.cerebras.ai/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "togetherai",
        env_key_candidates: &["TOGETHER_API_KEY", "TOGETHER_AI_API_KEY"],
        base_url: "https://api.together.xyz/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "fireworks",
        env_key_candidates: &["FIREWORKS_API_KEY"],
        base_url: "https://api.fireworks.ai/inference/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "moonshot",
        env_key_candidates: &["MOONSHOT_API_KEY"],
        base_url: "https://api.moonshot.ai/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
    // Z_AI_API_KEY is the older spelling; kept as a fallback candidate.
    ProviderDefinition {
        name: "zai",
        env_key_candidates: &["ZAI_API_KEY", "Z_AI_API_KEY"],
        base_url: "https://api.z.ai/api/paas/v4",
        api: ApiProtocol::OpenaiCompletions,
    },
    ProviderDefinition {
        name: "huggingface",
        env_key_candidates: &["HF_TOKEN", "HUGGINGFACE_HUB_TOKEN"],
        base_url: "https://router.huggingface.co/v1",
        api: ApiProtocol::OpenaiCompletions,
    },
];
