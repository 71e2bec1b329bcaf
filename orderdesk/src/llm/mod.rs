//! Generative-text backend abstraction.
//!
//! One interface, one implementation per provider, selected by
//! configuration. The pipeline holds a `Box<dyn TextGenerator>` and never
//! knows which vendor it is talking to.

pub mod provider;

pub use provider::{
    GeminiProvider, HfInferenceProvider, HfSeq2SeqProvider, LlmConfig, LlmError, OpenAiChatProvider,
    PlainTextProvider, ProviderFactory, ProviderInfo, ProviderKind, StubProvider, TextGenerator,
};
