use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Analyzer shared by indexing and querying: split on every run of
/// non-alphanumeric characters, then lowercase. No stop words, no stemming.
pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build()
}

/// Lowercase alphanumeric tokens of `text`. Punctuation-only or empty text
/// yields no tokens.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut analyzer = build_analyzer();
	let mut stream = analyzer.token_stream(text);
	let mut tokens = Vec::new();
	while stream.advance() { tokens.push(stream.token().text.clone()); }
	tokens
}
