//! Ensemble sentiment scoring for ingested articles.
//!
//! A financial classifier always runs. At most one LLM provider is consulted,
//! walking the provider chain in priority order until one answers with a valid
//! reply. The two scores are blended into one [`signal_core::SentimentRecord`].

pub mod classifier;
pub mod ensemble;
pub mod prompt;
pub mod providers;
pub mod response;

pub use classifier::{label_score, ClassifierOutput, SentimentClassifier, SentimentModel};
pub use ensemble::{combine_scores, EnsembleConfig, SentimentEnsemble, CLASSIFIER_ONLY_EXPLANATION};
pub use prompt::{sentiment_prompt, LLM_MAX_CHARS};
pub use providers::{any_configured, KeyedProvider, LlmProvider, ProviderReply};
pub use response::{extract_json_object, parse_llm_response, LlmAnalysis};
