pub mod analysis_llm;

pub use analysis_llm::OpenAiAnalysisAdapter;
