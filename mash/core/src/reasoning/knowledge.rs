//! Platform knowledge topics
//!
//! Questions about the platform itself get a topic-specific system prompt
//! in place of the default preamble.

use serde::{Deserialize, Serialize};

/// Topic of a platform knowledge question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeTopic {
    /// What the platform is
    PlatformOverview,
    /// Features and capabilities
    Features,
    /// Pricing tiers
    PricingTiers,
    /// Small vs large language models
    ModelTypes,
    /// Industry applications
    Industries,
    /// Usage advice
    BestPractices,
}

const TOPIC_KEYWORDS: &[(KnowledgeTopic, &[&str])] = &[
    (
        KnowledgeTopic::PlatformOverview,
        &[
            "what is artintel",
            "about artintel",
            "tell me about artintel",
            "artintel platform",
            "platform overview",
        ],
    ),
    (
        KnowledgeTopic::Features,
        &[
            "features",
            "what can artintel do",
            "capabilities",
            "what does artintel offer",
            "how does artintel work",
        ],
    ),
    (
        KnowledgeTopic::PricingTiers,
        &[
            "pricing",
            "tiers",
            "subscription",
            "how much does it cost",
            "free tier",
            "pro tier",
            "enterprise tier",
        ],
    ),
    (
        KnowledgeTopic::ModelTypes,
        &[
            "models",
            "slm",
            "llm",
            "small language model",
            "large language model",
            "model difference",
            "which model",
        ],
    ),
    (
        KnowledgeTopic::Industries,
        &[
            "industry",
            "healthcare",
            "finance",
            "legal",
            "retail",
            "e-commerce",
            "ecommerce",
        ],
    ),
    (
        KnowledgeTopic::BestPractices,
        &[
            "best practice",
            "best way to",
            "recommended way",
            "how should i",
            "tips for",
            "advice on",
        ],
    ),
];

const ASSISTANT_INTRO: &str = "You are Mash, the intelligent assistant for Artintel, a comprehensive platform for discovering, fine-tuning, and deploying language models.";

impl KnowledgeTopic {
    /// Detect a topic in a user message; first matching topic wins
    pub fn detect(message: &str) -> Option<Self> {
        let message = message.to_lowercase();
        TOPIC_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| message.contains(k)))
            .map(|(topic, _)| *topic)
    }

    /// Stable snake_case label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PlatformOverview => "platform_overview",
            Self::Features => "features",
            Self::PricingTiers => "pricing_tiers",
            Self::ModelTypes => "model_types",
            Self::Industries => "industries",
            Self::BestPractices => "best_practices",
        }
    }

    /// System prompt for reasoning about this topic
    pub fn system_prompt(&self) -> String {
        let body = match self {
            Self::PlatformOverview => "The user is asking about general information about the Artintel platform. Provide a clear, concise overview of what Artintel is, its core philosophy, goals, and vision.
Focus on explaining how Artintel bridges the gap between AI research and practical applications for organizations.
Be conversational but informative, emphasizing Artintel's key differentiators and value proposition.",
            Self::Features => "The user is asking about Artintel's features and capabilities. Explain the key components of the platform including:
- Model Selection & Discovery
- Data Integration & Preprocessing
- Fine-Tuning Workflows
- Deployment & Serving
- Monitoring & Alerts
- Cost Management
Focus on practical benefits and how these features solve real business problems.
Be conversational but specific, highlighting the most relevant features based on the user's specific query.",
            Self::PricingTiers => "The user is asking about Artintel's pricing and tier options. Provide clear information about the available tiers:
- Free Tier: For startups, educators, solo developers with access to lightweight models
- Pro Tier: For SMEs and mid-sized teams with access to mid-sized LLMs and guided fine-tuning
- Enterprise Premium: For regulated industries and large enterprises with access to the largest models
Focus on helping the user understand which tier would best fit their needs based on their requirements.
Be conversational but factual, highlighting the value proposition of each tier.",
            Self::ModelTypes => "The user is asking about different types of language models. Explain the differences between:
- Small Language Models (SLMs): Typically ranging from a few million to a few billion parameters
- Large Language Models (LLMs): Ranging from several billion to hundreds of billions of parameters
Focus on the strengths, limitations, and appropriate use cases for each model type.
Be conversational but educational, helping the user understand which model type would be most suitable for their specific needs.",
            Self::Industries => "The user is asking about industry-specific applications of Artintel. Provide insights on how Artintel is used in different sectors such as:
- Healthcare: For analyzing EHRs, medical coding, and clinical decision support
- Finance: For fraud detection, loan underwriting, and market analysis
- Legal: For contract analysis, eDiscovery, and legal brief summarization
- Retail & E-Commerce: For chatbots, inventory forecasting, and product review analysis
Focus on real-world examples and specific benefits for each industry.
Be conversational but practical, highlighting industry-specific challenges that Artintel solves.",
            Self::BestPractices => "The user is asking about best practices for using Artintel effectively. Provide expert guidance on:
- Model Selection: Balancing complexity with resource constraints
- Fine-Tuning: Ensuring high-quality data and appropriate hyperparameters
- Deployment: Implementing proper monitoring, scaling, and version control
Focus on actionable advice that helps users maximize their success with the platform.
Be conversational but authoritative, sharing insights that come from experience with the platform.",
        };
        format!("{ASSISTANT_INTRO}\n{body}")
    }
}

impl std::fmt::Display for KnowledgeTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection() {
        assert_eq!(
            KnowledgeTopic::detect("What is Artintel?"),
            Some(KnowledgeTopic::PlatformOverview)
        );
        assert_eq!(
            KnowledgeTopic::detect("how much does it cost per month"),
            Some(KnowledgeTopic::PricingTiers)
        );
        assert_eq!(
            KnowledgeTopic::detect("SLM or LLM for support tickets?"),
            Some(KnowledgeTopic::ModelTypes)
        );
        assert_eq!(KnowledgeTopic::detect("list my datasets"), None);
    }

    #[test]
    fn test_features_checked_before_models() {
        assert_eq!(
            KnowledgeTopic::detect("features for models"),
            Some(KnowledgeTopic::Features)
        );
    }

    #[test]
    fn test_system_prompt_intro() {
        let prompt = KnowledgeTopic::Industries.system_prompt();
        assert!(prompt.starts_with(ASSISTANT_INTRO));
        assert!(prompt.contains("Healthcare"));
    }
}
